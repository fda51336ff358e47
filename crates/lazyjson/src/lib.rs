//! Lazy, seek-based JSON reading.
//!
//! A JSON document is navigated through [`Node`] handles that remember only
//! where their bytes live in the underlying stream. Nothing is materialised
//! until asked for: containers hand out child handles on demand, strings
//! stream their characters one at a time, and [`Node::decode`] builds a full
//! [`Value`] only when the caller wants one.
//!
//! The source can be anything `Read + Seek`: a `File`, a `BufReader<File>`,
//! or an in-memory `Cursor`. All handles over one document share the source
//! cursor and re-seek before every read, so interleaving navigation across
//! handles is fine (on one thread).
//!
//! ```
//! use std::io::Cursor;
//!
//! let doc = br#"{"answer": 42, "tags": ["a", "b"]}"#.to_vec();
//! let mut root = lazyjson::load(Cursor::new(doc)).unwrap();
//! let mut answer = root.get("answer").unwrap().unwrap();
//! assert_eq!(answer.decode().unwrap(), lazyjson::Value::Int(42));
//! ```

mod array;
mod error;
mod lex;
mod node;
mod number;
mod object;
mod string;
mod value;

pub use array::Elements;
pub use error::JsonError;
pub use node::{load, load_with, Kind, Node};
pub use number::Number;
pub use object::Entries;
pub use string::Chars;
pub use value::Value;
