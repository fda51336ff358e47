//! `Entries` — the lazy object walker.

use std::io::{Read, Seek};

use crate::error::JsonError;
use crate::lex;
use crate::node::{self, Kind, Node, ObjectState, Payload};

#[derive(Clone, Copy)]
enum State {
    /// Not yet past the opening `{`.
    Start,
    /// A property value was yielded; it must be stepped over before the
    /// separator.
    AfterValue { value_start: u64 },
    Done,
}

/// A lazy `(key, child)` iterator over an object handle.
///
/// Keys are decoded through the string streamer; the child handle points at
/// the property value. Iteration yields every occurrence of a duplicated key
/// in source order, while the offset cache keeps only the last occurrence
/// seen, so random access resolves duplicates last-wins. Walking to the
/// closing `}` records the handle's end offset and property count.
pub struct Entries<'a, R: Read + Seek> {
    node: &'a mut Node<R>,
    state: State,
    /// Entries yielded so far.
    count: usize,
}

fn state_mut<'a, R>(node: &'a mut Node<R>) -> Result<&'a mut ObjectState, JsonError> {
    match &mut node.payload {
        Payload::Object(s) => Ok(s),
        _ => Err(JsonError::Logic("object walker over a non-object handle")),
    }
}

impl<'a, R: Read + Seek> Entries<'a, R> {
    pub(crate) fn new(node: &'a mut Node<R>) -> Self {
        Self {
            node,
            state: State::Start,
            count: 0,
        }
    }

    fn step(&mut self) -> Result<Option<(String, Node<R>)>, JsonError> {
        match self.state {
            State::Done => Ok(None),
            State::Start => {
                {
                    let mut r = self.node.reader.borrow_mut();
                    r.seek_to(self.node.start)?;
                    if r.byte()? != b'{' {
                        return Err(JsonError::Logic("object handle does not start at '{'"));
                    }
                    lex::skip_whitespace(&mut r)?;
                    let pos = r.tell();
                    match r.peek()? {
                        None => return Err(JsonError::UnexpectedEnd(pos)),
                        Some(b'}') => {
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
                self.yield_entry()
            }
            State::AfterValue { value_start } => {
                node::parse_value_at(&self.node.reader, value_start)?;
                let mut r = self.node.reader.borrow_mut();
                lex::skip_whitespace(&mut r)?;
                let pos = r.tell();
                match r.byte()? {
                    b',' => {
                        lex::skip_whitespace(&mut r)?;
                        let pos = r.tell();
                        match r.peek()? {
                            None => Err(JsonError::UnexpectedEnd(pos)),
                            Some(b'}') => Err(JsonError::TrailingComma(pos)),
                            Some(_) => {
                                drop(r);
                                self.yield_entry()
                            }
                        }
                    }
                    b'}' => {
                        let end = r.tell();
                        drop(r);
                        self.node.set_end(end);
                        state_mut(self.node)?.total = Some(self.count);
                        self.state = State::Done;
                        Ok(None)
                    }
                    _ => Err(JsonError::ExpectedSeparator(pos, '}')),
                }
            }
        }
    }

    /// Reads one `"key": value` pair at the cursor, memoising the value
    /// offset under the key, and dispatches a handle for the value.
    fn yield_entry(&mut self) -> Result<Option<(String, Node<R>)>, JsonError> {
        let key_start = self.node.reader.borrow().tell();
        let mut key_node = Node::dispatch(self.node.reader.clone(), false)?;
        if key_node.kind() != Kind::Str {
            return Err(JsonError::NonStringKey(key_start));
        }
        let key: String = key_node.chars()?.collect::<Result<String, JsonError>>()?;
        let key_end = key_node
            .end_offset()
            .ok_or(JsonError::Logic("key handle has no end offset"))?;

        let value_start = {
            let mut r = self.node.reader.borrow_mut();
            r.seek_to(key_end)?;
            lex::skip_whitespace(&mut r)?;
            let pos = r.tell();
            match r.peek()? {
                None => return Err(JsonError::UnexpectedEnd(pos)),
                Some(b':') => {
                    r.byte()?;
                }
                Some(_) => return Err(JsonError::ExpectedColon(pos)),
            }
            lex::skip_whitespace(&mut r)?;
            r.tell()
        };

        if self.node.use_cache {
            let state = state_mut(self.node)?;
            match state.offsets.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value_start,
                None => state.offsets.push((key.clone(), value_start)),
            }
        }
        let child = Node::dispatch(self.node.reader.clone(), self.node.use_cache)?;
        self.state = State::AfterValue { value_start };
        self.count += 1;
        Ok(Some((key, child)))
    }
}

impl<R: Read + Seek> Iterator for Entries<'_, R> {
    type Item = Result<(String, Node<R>), JsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}
