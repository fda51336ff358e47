//! `Node` — the value handle, and the `load` dispatcher that creates one.

use std::cell::RefCell;
use std::io::{Read, Seek};
use std::rc::Rc;

use lazyjson_buffers::SeekReader;

use crate::array::Elements;
use crate::error::JsonError;
use crate::lex;
use crate::number::{self, Number};
use crate::object::Entries;
use crate::string::Chars;
use crate::value::Value;

pub(crate) type SharedReader<R> = Rc<RefCell<SeekReader<R>>>;

/// The type tag of a value handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Number,
    Str,
    Array,
    Object,
}

pub(crate) struct ParsedNumber {
    pub raw: String,
    pub value: Number,
}

#[derive(Default)]
pub(crate) struct ArrayState {
    /// Memoised child offsets, index-ordered. Populated only when the handle
    /// caches; grows as iteration progresses.
    pub offsets: Vec<u64>,
    /// Element count, set once after a full traversal.
    pub total: Option<usize>,
}

#[derive(Default)]
pub(crate) struct ObjectState {
    /// Memoised key → value-offset pairs, insertion-ordered. A duplicate key
    /// overwrites its earlier offset, so lookups see the last occurrence.
    pub offsets: Vec<(String, u64)>,
    /// Property count, set once after a full traversal.
    pub total: Option<usize>,
}

pub(crate) enum Payload {
    Null,
    Bool(Option<bool>),
    Number(Option<ParsedNumber>),
    Str,
    Array(ArrayState),
    Object(ObjectState),
}

/// A handle to one JSON value, identified by the byte offset of its first
/// byte.
///
/// A handle starts out unparsed: it knows its variant (from the first byte)
/// and its start offset, nothing else. Reading operations parse on demand and
/// memoise what they learn: the end offset, a scalar's decoded value, a
/// container's child offsets. Handles over one document share the source
/// cursor and re-seek before every read, so the caller may interleave
/// operations on different handles freely.
pub struct Node<R> {
    pub(crate) reader: SharedReader<R>,
    pub(crate) start: u64,
    pub(crate) end: Option<u64>,
    pub(crate) use_cache: bool,
    pub(crate) payload: Payload,
}

/// Loads the value starting at the source's current cursor position, with
/// child-offset caching enabled.
pub fn load<R: Read + Seek>(source: R) -> Result<Node<R>, JsonError> {
    load_with(source, true)
}

/// Loads the value starting at the source's current cursor position.
///
/// With `use_cache` disabled, container handles memoise nothing and random
/// access degrades to a forward walk; memory use stays flat no matter how
/// many children are iterated.
pub fn load_with<R: Read + Seek>(source: R, use_cache: bool) -> Result<Node<R>, JsonError> {
    let reader = SeekReader::new(source).map_err(|_| JsonError::InvalidSource)?;
    if reader.is_empty() {
        return Err(JsonError::InvalidSource);
    }
    Node::dispatch(Rc::new(RefCell::new(reader)), use_cache)
}

impl<R: Read + Seek> Node<R> {
    /// Skips whitespace, maps the next byte to a variant without consuming
    /// it, and constructs an unparsed handle there.
    pub(crate) fn dispatch(reader: SharedReader<R>, use_cache: bool) -> Result<Self, JsonError> {
        let (start, kind) = {
            let mut r = reader.borrow_mut();
            lex::skip_whitespace(&mut r)?;
            let pos = r.tell();
            let first = r.peek()?.ok_or(JsonError::UnexpectedEnd(pos))?;
            let kind = match first {
                b'{' => Kind::Object,
                b'[' => Kind::Array,
                b'"' => Kind::Str,
                b't' | b'f' => Kind::Bool,
                b'n' => Kind::Null,
                b'-' | b'0'..=b'9' => Kind::Number,
                other => return Err(JsonError::UnexpectedByte(pos, other)),
            };
            (pos, kind)
        };
        let payload = match kind {
            Kind::Null => Payload::Null,
            Kind::Bool => Payload::Bool(None),
            Kind::Number => Payload::Number(None),
            Kind::Str => Payload::Str,
            Kind::Array => Payload::Array(ArrayState::default()),
            Kind::Object => Payload::Object(ObjectState::default()),
        };
        Ok(Node {
            reader,
            start,
            end: None,
            use_cache,
            payload,
        })
    }

    /// Returns the handle's type tag.
    pub fn kind(&self) -> Kind {
        match &self.payload {
            Payload::Null => Kind::Null,
            Payload::Bool(_) => Kind::Bool,
            Payload::Number(_) => Kind::Number,
            Payload::Str => Kind::Str,
            Payload::Array(_) => Kind::Array,
            Payload::Object(_) => Kind::Object,
        }
    }

    /// Absolute offset of the value's first byte.
    pub fn start_offset(&self) -> u64 {
        self.start
    }

    /// Absolute offset one past the value's last byte, once parsed.
    pub fn end_offset(&self) -> Option<u64> {
        self.end
    }

    /// A handle is parsed once its end offset is known.
    pub fn is_parsed(&self) -> bool {
        self.end.is_some()
    }

    pub(crate) fn set_end(&mut self, end: u64) {
        if self.end.is_none() {
            self.end = Some(end);
        }
    }

    /// Fully recognises this value, leaving the cursor one past its last
    /// byte. On an already-parsed handle this is a single seek; no bytes are
    /// re-read.
    pub fn parse(&mut self) -> Result<(), JsonError> {
        if let Some(end) = self.end {
            self.reader.borrow_mut().seek_to(end)?;
            return Ok(());
        }
        match self.kind() {
            Kind::Null => self.parse_null(),
            Kind::Bool => self.parse_bool().map(|_| ()),
            Kind::Number => self.parse_number().map(|_| ()),
            Kind::Str => {
                let mut chars = self.chars()?;
                for c in chars.by_ref() {
                    c?;
                }
                Ok(())
            }
            Kind::Array => {
                let mut items = self.elements()?;
                for item in items.by_ref() {
                    item?;
                }
                Ok(())
            }
            Kind::Object => {
                let mut entries = self.entries()?;
                for entry in entries.by_ref() {
                    entry?;
                }
                Ok(())
            }
        }
    }

    fn parse_null(&mut self) -> Result<(), JsonError> {
        let end = {
            let mut r = self.reader.borrow_mut();
            r.seek_to(self.start)?;
            if r.buf(4)? != b"null" {
                return Err(JsonError::InvalidLiteral(self.start));
            }
            r.tell()
        };
        self.set_end(end);
        Ok(())
    }

    fn parse_bool(&mut self) -> Result<bool, JsonError> {
        let (value, end) = {
            let mut r = self.reader.borrow_mut();
            r.seek_to(self.start)?;
            let value = match r.byte()? {
                b't' => {
                    if r.buf(3)? != b"rue" {
                        return Err(JsonError::InvalidLiteral(self.start));
                    }
                    true
                }
                b'f' => {
                    if r.buf(4)? != b"alse" {
                        return Err(JsonError::InvalidLiteral(self.start));
                    }
                    false
                }
                _ => return Err(JsonError::InvalidLiteral(self.start)),
            };
            (value, r.tell())
        };
        self.set_end(end);
        self.payload = Payload::Bool(Some(value));
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Number, JsonError> {
        let (raw, end) = {
            let mut r = self.reader.borrow_mut();
            number::scan(&mut r, self.start)?
        };
        let value = number::decode(&raw)?;
        self.set_end(end);
        self.payload = Payload::Number(Some(ParsedNumber { raw, value }));
        Ok(value)
    }

    /// The decoded truth value of a boolean handle.
    pub fn bool_value(&mut self) -> Result<bool, JsonError> {
        if let Payload::Bool(None) = self.payload {
            return self.parse_bool();
        }
        let value = match &self.payload {
            Payload::Bool(Some(v)) => *v,
            _ => return Err(JsonError::Logic("bool_value() on a non-boolean handle")),
        };
        self.parse()?;
        Ok(value)
    }

    /// The decoded numeric value of a number handle.
    pub fn number(&mut self) -> Result<Number, JsonError> {
        if let Payload::Number(None) = self.payload {
            return self.parse_number();
        }
        let value = match &self.payload {
            Payload::Number(Some(n)) => n.value,
            _ => return Err(JsonError::Logic("number() on a non-number handle")),
        };
        self.parse()?;
        Ok(value)
    }

    /// The raw text of a number handle, exactly as it appears in the source.
    /// Useful when the decoded value saturated to `±∞`.
    pub fn raw_text(&mut self) -> Result<&str, JsonError> {
        if let Payload::Number(None) = self.payload {
            self.parse_number()?;
        }
        match &self.payload {
            Payload::Number(Some(n)) => Ok(&n.raw),
            _ => Err(JsonError::Logic("raw_text() on a non-number handle")),
        }
    }

    /// A fresh lazy character stream over a string handle. The stream is not
    /// restartable; call again for a new one.
    pub fn chars(&mut self) -> Result<Chars<'_, R>, JsonError> {
        match self.payload {
            Payload::Str => Ok(Chars::new(self)),
            _ => Err(JsonError::Logic("chars() on a non-string handle")),
        }
    }

    /// The whole decoded string of a string handle.
    pub fn string_value(&mut self) -> Result<String, JsonError> {
        self.chars()?.collect()
    }

    /// A fresh `(index, child)` iterator over an array handle.
    pub fn elements(&mut self) -> Result<Elements<'_, R>, JsonError> {
        match self.payload {
            Payload::Array(_) => Ok(Elements::new(self)),
            _ => Err(JsonError::Logic("elements() on a non-array handle")),
        }
    }

    /// A fresh `(key, child)` iterator over an object handle.
    pub fn entries(&mut self) -> Result<Entries<'_, R>, JsonError> {
        match self.payload {
            Payload::Object(_) => Ok(Entries::new(self)),
            _ => Err(JsonError::Logic("entries() on a non-object handle")),
        }
    }

    /// Number of children of a container handle. Walks the container if the
    /// count is not yet known.
    pub fn len(&mut self) -> Result<usize, JsonError> {
        match &self.payload {
            Payload::Array(s) => {
                if let Some(total) = s.total {
                    return Ok(total);
                }
            }
            Payload::Object(s) => {
                if let Some(total) = s.total {
                    return Ok(total);
                }
            }
            _ => return Err(JsonError::Logic("len() on a non-container handle")),
        }
        self.parse()?;
        match &self.payload {
            Payload::Array(s) => s
                .total
                .ok_or(JsonError::Logic("array walk recorded no count")),
            Payload::Object(s) => s
                .total
                .ok_or(JsonError::Logic("object walk recorded no count")),
            _ => Err(JsonError::Logic("len() on a non-container handle")),
        }
    }

    /// The child at `index` of an array handle, or `None` past the end.
    ///
    /// With caching on, a memoised offset is seeked directly; otherwise the
    /// array is walked forward from the start.
    pub fn at(&mut self, index: usize) -> Result<Option<Node<R>>, JsonError> {
        let cached = match &self.payload {
            Payload::Array(s) => {
                if let Some(total) = s.total {
                    if index >= total {
                        return Ok(None);
                    }
                }
                s.offsets.get(index).copied()
            }
            _ => return Err(JsonError::Logic("at() on a non-array handle")),
        };
        if let Some(offset) = cached {
            self.reader.borrow_mut().seek_to(offset)?;
            return Node::dispatch(self.reader.clone(), self.use_cache).map(Some);
        }
        let mut items = self.elements()?;
        for item in items.by_ref() {
            let (i, child) = item?;
            if i == index {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Whether an array handle has a child at `index`.
    pub fn has_index(&mut self, index: usize) -> Result<bool, JsonError> {
        match &self.payload {
            Payload::Array(s) => {
                if let Some(total) = s.total {
                    return Ok(index < total);
                }
            }
            _ => return Err(JsonError::Logic("has_index() on a non-array handle")),
        }
        Ok(self.at(index)?.is_some())
    }

    /// The value of property `key` of an object handle, or `None` if absent.
    ///
    /// A cached offset (the last occurrence walked so far) is seeked
    /// directly. On a miss, the object is walked forward until the key turns
    /// up or the object ends; once a caching handle has fully walked the
    /// object, its cache answers misses without touching the source.
    pub fn get(&mut self, key: &str) -> Result<Option<Node<R>>, JsonError> {
        let (cached, fully_walked) = match &self.payload {
            Payload::Object(s) => (
                s.offsets.iter().find(|(k, _)| k == key).map(|(_, off)| *off),
                s.total.is_some(),
            ),
            _ => return Err(JsonError::Logic("get() on a non-object handle")),
        };
        if let Some(offset) = cached {
            self.reader.borrow_mut().seek_to(offset)?;
            return Node::dispatch(self.reader.clone(), self.use_cache).map(Some);
        }
        // Without caching the offsets table stays empty no matter how far the
        // object has been walked, so a miss proves nothing; scan forward.
        if fully_walked && self.use_cache {
            return Ok(None);
        }
        let mut entries = self.entries()?;
        for entry in entries.by_ref() {
            let (k, child) = entry?;
            if k == key {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Whether an object handle has property `key`. Once a caching handle
    /// has fully walked the object, the cache is consulted exclusively.
    pub fn has_key(&mut self, key: &str) -> Result<bool, JsonError> {
        let (hit, fully_walked) = match &self.payload {
            Payload::Object(s) => (
                s.offsets.iter().any(|(k, _)| k == key),
                s.total.is_some(),
            ),
            _ => return Err(JsonError::Logic("has_key() on a non-object handle")),
        };
        if hit {
            return Ok(true);
        }
        if fully_walked && self.use_cache {
            return Ok(false);
        }
        Ok(self.get(key)?.is_some())
    }

    /// Handles are read-only views; setting a property always fails.
    pub fn set(&mut self, _key: &str, _value: Value) -> Result<(), JsonError> {
        Err(JsonError::ReadOnly)
    }

    /// Handles are read-only views; removing a property always fails.
    pub fn remove(&mut self, _key: &str) -> Result<(), JsonError> {
        Err(JsonError::ReadOnly)
    }

    /// Decodes this value in full, recursing through containers. Objects come
    /// back as ordered pairs with every key occurrence preserved.
    pub fn decode(&mut self) -> Result<Value, JsonError> {
        match self.kind() {
            Kind::Null => {
                self.parse()?;
                Ok(Value::Null)
            }
            Kind::Bool => self.bool_value().map(Value::Bool),
            Kind::Number => self.number().map(|n| match n {
                Number::Int(i) => Value::Int(i),
                Number::Float(f) => Value::Float(f),
            }),
            Kind::Str => self.string_value().map(Value::Str),
            Kind::Array => {
                let mut items = Vec::new();
                let mut iter = self.elements()?;
                for item in iter.by_ref() {
                    let (_, mut child) = item?;
                    items.push(child.decode()?);
                }
                Ok(Value::Array(items))
            }
            Kind::Object => {
                let mut fields = Vec::new();
                let mut iter = self.entries()?;
                for entry in iter.by_ref() {
                    let (key, mut child) = entry?;
                    fields.push((key, child.decode()?));
                }
                Ok(Value::Object(fields))
            }
        }
    }

    /// Decodes this value with objects in the associative map shape
    /// (duplicate keys collapse to the last occurrence).
    pub fn decode_associative(&mut self) -> Result<serde_json::Value, JsonError> {
        self.decode().map(Into::into)
    }
}

/// Recognises the value at `offset` with a scratch handle and returns its end
/// offset, leaving the cursor there. Used by the container walkers to step
/// past a child regardless of what the caller did with the yielded handle.
pub(crate) fn parse_value_at<R: Read + Seek>(
    reader: &SharedReader<R>,
    offset: u64,
) -> Result<u64, JsonError> {
    reader.borrow_mut().seek_to(offset)?;
    let mut scratch = Node::dispatch(reader.clone(), false)?;
    scratch.parse()?;
    scratch
        .end_offset()
        .ok_or(JsonError::Logic("parsed value has no end offset"))
}
