//! `Elements` — the lazy array walker.

use std::io::{Read, Seek};

use crate::error::JsonError;
use crate::lex;
use crate::node::{self, ArrayState, Node, Payload};

#[derive(Clone, Copy)]
enum State {
    /// Not yet past the opening `[`.
    Start,
    /// A child was yielded; it must be stepped over before the separator.
    AfterChild { child_start: u64 },
    Done,
}

/// A lazy `(index, child)` iterator over an array handle.
///
/// Before reading the separator after a child, the walker re-parses that
/// child from its own recorded offset, so the caller may have moved the
/// cursor (or left the yielded handle untouched) in the meantime. Walking to
/// the closing `]` records the handle's end offset and element count; with
/// caching on, each child offset is memoised before the child is yielded.
pub struct Elements<'a, R: Read + Seek> {
    node: &'a mut Node<R>,
    state: State,
    index: usize,
}

fn state_mut<'a, R>(node: &'a mut Node<R>) -> Result<&'a mut ArrayState, JsonError> {
    match &mut node.payload {
        Payload::Array(s) => Ok(s),
        _ => Err(JsonError::Logic("array walker over a non-array handle")),
    }
}

impl<'a, R: Read + Seek> Elements<'a, R> {
    pub(crate) fn new(node: &'a mut Node<R>) -> Self {
        Self {
            node,
            state: State::Start,
            index: 0,
        }
    }

    fn step(&mut self) -> Result<Option<(usize, Node<R>)>, JsonError> {
        match self.state {
            State::Done => Ok(None),
            State::Start => {
                {
                    let mut r = self.node.reader.borrow_mut();
                    r.seek_to(self.node.start)?;
                    if r.byte()? != b'[' {
                        return Err(JsonError::Logic("array handle does not start at '['"));
                    }
                    lex::skip_whitespace(&mut r)?;
                    let pos = r.tell();
                    match r.peek()? {
                        None => return Err(JsonError::UnexpectedEnd(pos)),
                        Some(b']') => {
                            r.byte()?;
                            let end = r.tell();
                            drop(r);
                            self.node.set_end(end);
                            state_mut(self.node)?.total = Some(0);
                            self.state = State::Done;
                            return Ok(None);
                        }
                        Some(_) => {}
                    }
                }
                self.yield_child()
            }
            State::AfterChild { child_start } => {
                node::parse_value_at(&self.node.reader, child_start)?;
                let mut r = self.node.reader.borrow_mut();
                lex::skip_whitespace(&mut r)?;
                let pos = r.tell();
                match r.byte()? {
                    b',' => {
                        lex::skip_whitespace(&mut r)?;
                        let pos = r.tell();
                        match r.peek()? {
                            None => Err(JsonError::UnexpectedEnd(pos)),
                            Some(b']') => Err(JsonError::TrailingComma(pos)),
                            Some(_) => {
                                drop(r);
                                self.index += 1;
                                self.yield_child()
                            }
                        }
                    }
                    b']' => {
                        let end = r.tell();
                        drop(r);
                        self.node.set_end(end);
                        state_mut(self.node)?.total = Some(self.index + 1);
                        self.state = State::Done;
                        Ok(None)
                    }
                    _ => Err(JsonError::ExpectedSeparator(pos, ']')),
                }
            }
        }
    }

    /// Records (and, with caching on, memoises) the offset of the child at
    /// the cursor, then dispatches a handle for it.
    fn yield_child(&mut self) -> Result<Option<(usize, Node<R>)>, JsonError> {
        let child_start = self.node.reader.borrow().tell();
        if self.node.use_cache {
            let state = state_mut(self.node)?;
            if state.offsets.len() == self.index {
                state.offsets.push(child_start);
            }
        }
        let child = Node::dispatch(self.node.reader.clone(), self.node.use_cache)?;
        self.state = State::AfterChild { child_start };
        Ok(Some((self.index, child)))
    }
}

impl<R: Read + Seek> Iterator for Elements<'_, R> {
    type Item = Result<(usize, Node<R>), JsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}
