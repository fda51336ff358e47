//! Cursor-discipline and laziness checks: what gets read, when, and what
//! never does.

use std::cell::Cell;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::rc::Rc;

use lazyjson::{load, load_with, Value};

/// Shared read counters for [`Tracked`].
#[derive(Clone, Default)]
struct ReadStats {
    /// Highest offset one past any byte actually read.
    max_read_end: Rc<Cell<u64>>,
    /// Number of read calls issued.
    reads: Rc<Cell<u64>>,
}

/// A cursor that records how far into the stream reads have reached.
struct Tracked {
    inner: Cursor<Vec<u8>>,
    stats: ReadStats,
}

impl Read for Tracked {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.stats.reads.set(self.stats.reads.get() + 1);
            let end = self.inner.position();
            if end > self.stats.max_read_end.get() {
                self.stats.max_read_end.set(end);
            }
        }
        Ok(n)
    }
}

impl Seek for Tracked {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.inner.seek(pos)
    }
}

fn tracked(input: &str) -> (Tracked, ReadStats) {
    let stats = ReadStats::default();
    (
        Tracked {
            inner: Cursor::new(input.as_bytes().to_vec()),
            stats: stats.clone(),
        },
        stats,
    )
}

fn doc(input: &str) -> Cursor<Vec<u8>> {
    Cursor::new(input.as_bytes().to_vec())
}

#[test]
fn bytes_after_the_value_are_never_read() {
    let (src, stats) = tracked("[1,2] this is not json");
    let mut arr = load(src).unwrap();
    arr.parse().unwrap();
    assert_eq!(arr.end_offset(), Some(5));
    assert!(stats.max_read_end.get() <= 5);
}

#[test]
fn reparsing_only_seeks() {
    let (src, stats) = tracked(r#"{"a": [1, 2, 3]}"#);
    let mut root = load(src).unwrap();
    root.parse().unwrap();
    let reads = stats.reads.get();
    root.parse().unwrap();
    assert_eq!(stats.reads.get(), reads);
}

#[test]
fn scalar_lookup_does_not_touch_later_siblings() {
    let (src, stats) = tracked(r#"[42, "a very long tail string"]"#);
    let mut arr = load(src).unwrap();
    let mut first = arr.at(0).unwrap().unwrap();
    assert_eq!(first.decode().unwrap(), Value::Int(42));
    // "42" plus its lookahead byte is all the walk needed
    assert!(stats.max_read_end.get() <= 5);
}

#[test]
fn parsing_starts_at_the_source_cursor() {
    let mut cur = Cursor::new(b"garbage[1,2]".to_vec());
    cur.set_position(7);
    let mut arr = load(cur).unwrap();
    assert_eq!(arr.start_offset(), 7);
    assert_eq!(
        arr.decode().unwrap(),
        Value::Array(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn interleaved_navigation_re_seeks() {
    let mut root = load(doc(r#"{"a":"xy","b":[1,2]}"#)).unwrap();
    let mut a = root.get("a").unwrap().unwrap();
    let mut b = root.get("b").unwrap().unwrap();
    let mut chars = a.chars().unwrap();
    assert_eq!(chars.next().unwrap().unwrap(), 'x');
    // move the shared cursor far away between character reads
    assert_eq!(
        b.decode().unwrap(),
        Value::Array(vec![Value::Int(1), Value::Int(2)])
    );
    assert_eq!(chars.next().unwrap().unwrap(), 'y');
    assert!(chars.next().is_none());
}

#[test]
fn partial_iteration_restarts_afresh() {
    let mut arr = load(doc("[1,2,3]")).unwrap();
    {
        let mut iter = arr.elements().unwrap();
        iter.next().unwrap().unwrap();
        iter.next().unwrap().unwrap();
    }
    assert!(!arr.is_parsed());
    let all: Vec<usize> = arr
        .elements()
        .unwrap()
        .map(|item| item.unwrap().0)
        .collect();
    assert_eq!(all, vec![0, 1, 2]);
    assert!(arr.is_parsed());
}

#[test]
fn uncached_walk_over_many_elements() {
    let n = 10_000;
    let mut text = String::with_capacity(n * 6);
    text.push('[');
    for i in 0..n {
        if i > 0 {
            text.push(',');
        }
        text.push_str("\"it\"");
    }
    text.push(']');

    let mut arr = load_with(Cursor::new(text.into_bytes()), false).unwrap();
    let mut count = 0;
    let mut iter = arr.elements().unwrap();
    for item in iter.by_ref() {
        let (_, child) = item.unwrap();
        assert!(!child.is_parsed());
        count += 1;
    }
    assert_eq!(count, n);
    assert_eq!(arr.len().unwrap(), n);
}

#[test]
fn reads_from_a_real_file() {
    let path = std::env::temp_dir().join(format!("lazyjson-test-{}.json", std::process::id()));
    std::fs::write(&path, br#"{"k": [true, "v"]}"#).unwrap();
    let file = std::fs::File::open(&path).unwrap();
    let mut root = load(std::io::BufReader::new(file)).unwrap();
    let mut k = root.get("k").unwrap().unwrap();
    let mut v = k.at(1).unwrap().unwrap();
    assert_eq!(v.decode().unwrap(), Value::Str("v".into()));
    drop(root);
    std::fs::remove_file(&path).unwrap();
}
