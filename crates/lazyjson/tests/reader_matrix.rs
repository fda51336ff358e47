use std::io::Cursor;

use lazyjson::{load, load_with, Number, Value};
use serde_json::json;

fn doc(input: &str) -> Cursor<Vec<u8>> {
    Cursor::new(input.as_bytes().to_vec())
}

#[test]
fn null_document() {
    assert_eq!(load(doc("null")).unwrap().decode().unwrap(), Value::Null);
}

#[test]
fn padded_boolean_document() {
    let mut node = load(doc(" \r\n\tfalse\r\n\t ")).unwrap();
    assert_eq!(node.decode().unwrap(), Value::Bool(false));
    assert_eq!(node.start_offset(), 4);
    assert_eq!(node.end_offset(), Some(9));
}

#[test]
fn float_document_keeps_raw_text() {
    let mut node = load(doc("-1234.5678e2")).unwrap();
    assert_eq!(node.number().unwrap(), Number::Float(-123456.78));
    assert_eq!(node.raw_text().unwrap(), "-1234.5678e2");
}

#[test]
fn overflowing_number_saturates() {
    let mut node = load(doc("1e1000")).unwrap();
    assert_eq!(node.number().unwrap(), Number::Float(f64::INFINITY));
    assert_eq!(node.raw_text().unwrap(), "1e1000");
}

#[test]
fn escaped_string_document() {
    let mut node = load(doc(r#""\u00e1lgebra\nI am happy \uD83D\uDE0A""#)).unwrap();
    assert_eq!(
        node.decode().unwrap(),
        Value::Str("álgebra\nI am happy 😊".into())
    );
}

#[test]
fn array_document() {
    let mut arr = load(doc("[1,2,3]")).unwrap();
    let mut yielded = Vec::new();
    let mut iter = arr.elements().unwrap();
    for item in iter.by_ref() {
        let (i, mut child) = item.unwrap();
        yielded.push((i, child.decode().unwrap()));
    }
    assert_eq!(
        yielded,
        vec![
            (0, Value::Int(1)),
            (1, Value::Int(2)),
            (2, Value::Int(3)),
        ]
    );
    assert_eq!(arr.len().unwrap(), 3);
    assert!(arr.at(3).unwrap().is_none());
    assert!(arr.has_index(2).unwrap());
    assert!(!arr.has_index(3).unwrap());
}

#[test]
fn nested_document_decodes_associatively() {
    let input = r#"{"str":"foo","int":1,"float":3.14,"bool1":true,"bool2":false,"null":null,"obj":{"foo":"bar"},"arr":["baz"]}"#;
    let mut root = load(doc(input)).unwrap();
    assert_eq!(
        root.decode_associative().unwrap(),
        json!({
            "str": "foo",
            "int": 1,
            "float": 3.14,
            "bool1": true,
            "bool2": false,
            "null": null,
            "obj": {"foo": "bar"},
            "arr": ["baz"],
        })
    );
}

#[test]
fn decode_matches_reference_parser() {
    let cases = [
        r#"[1,2.5,"x",null,true,{"b":[]}]"#,
        r#"{"a":{"b":{"c":[[],[0]]}},"d":"e"}"#,
        r#"  [ { "deep" : [ 1e2 , -3 ] } ]  "#,
    ];
    for input in cases {
        let ours = load(doc(input)).unwrap().decode_associative().unwrap();
        let reference: serde_json::Value = serde_json::from_str(input).unwrap();
        assert_eq!(ours, reference, "mismatch for {input}");
    }
}

#[test]
fn independent_scalars_in_one_array() {
    let mut arr = load(doc("[false, true]")).unwrap();
    assert!(!arr.at(0).unwrap().unwrap().bool_value().unwrap());
    assert!(arr.at(1).unwrap().unwrap().bool_value().unwrap());
    // parsing index 0 again must not disturb index 1
    assert!(!arr.at(0).unwrap().unwrap().bool_value().unwrap());
    assert!(arr.at(1).unwrap().unwrap().bool_value().unwrap());
}

#[test]
fn property_access_and_existence() {
    let mut obj = load(doc(r#"{"a":1,"b":2}"#)).unwrap();
    let mut a = obj.get("a").unwrap().unwrap();
    assert_eq!(a.decode().unwrap(), Value::Int(1));
    assert!(obj.has_key("b").unwrap());
    obj.parse().unwrap();
    assert!(!obj.has_key("z").unwrap());
}

#[test]
fn load_without_cache_still_navigates() {
    let mut arr = load_with(doc("[10,20,30]"), false).unwrap();
    assert_eq!(arr.len().unwrap(), 3);
    let mut mid = arr.at(1).unwrap().unwrap();
    assert_eq!(mid.decode().unwrap(), Value::Int(20));

    let mut obj = load_with(doc(r#"{"a":1,"b":2}"#), false).unwrap();
    let mut b = obj.get("b").unwrap().unwrap();
    assert_eq!(b.decode().unwrap(), Value::Int(2));

    // a full walk memoised nothing, so lookups must still scan forward
    let mut obj = load_with(doc(r#"{"a":1,"b":2}"#), false).unwrap();
    assert_eq!(obj.len().unwrap(), 2);
    assert!(obj.has_key("b").unwrap());
    let mut b = obj.get("b").unwrap().unwrap();
    assert_eq!(b.decode().unwrap(), Value::Int(2));
    assert!(!obj.has_key("z").unwrap());
    assert!(obj.get("z").unwrap().is_none());
}

#[test]
fn cached_random_access_matches_iteration() {
    let input = r#"[{"n":1},"two",3,[4],true,null]"#;
    let mut arr = load(doc(input)).unwrap();
    let mut walked = Vec::new();
    let mut iter = arr.elements().unwrap();
    for item in iter.by_ref() {
        let (i, mut child) = item.unwrap();
        walked.push((i, child.start_offset(), child.decode().unwrap()));
    }
    for (i, start, expected) in walked {
        let mut fresh = arr.at(i).unwrap().unwrap();
        assert_eq!(fresh.start_offset(), start);
        assert_eq!(fresh.decode().unwrap(), expected);
    }
}

#[test]
fn partial_cache_serves_repeat_lookups() {
    let mut arr = load(doc("[1,2,3]")).unwrap();
    {
        let mut iter = arr.elements().unwrap();
        let (i, _) = iter.next().unwrap().unwrap();
        assert_eq!(i, 0);
    }
    // the cache already holds index 0 even though iteration stopped early
    let mut again = arr.at(0).unwrap().unwrap();
    assert_eq!(again.decode().unwrap(), Value::Int(1));
    assert!(!arr.is_parsed());
}

#[test]
fn nested_navigation() {
    let mut root = load(doc(r#"{"users":[{"name":"ada"},{"name":"bob"}]}"#)).unwrap();
    let mut users = root.get("users").unwrap().unwrap();
    let mut second = users.at(1).unwrap().unwrap();
    let mut name = second.get("name").unwrap().unwrap();
    assert_eq!(name.decode().unwrap(), Value::Str("bob".into()));
}

#[test]
fn malformed_documents_fail() {
    let cases: &[&str] = &[
        "{\"x\":1,",
        "[1,]",
        "{1:2}",
        "[1 2]",
        "{\"a\"1}",
        "[,1]",
        "tru",
        "nulx",
        "{\"a\":}",
    ];
    for case in cases {
        let mut node = load(doc(case)).unwrap();
        assert!(node.parse().is_err(), "expected a failure for {case:?}");
        assert!(!node.is_parsed(), "failure must leave {case:?} unparsed");
    }
}

#[test]
fn streamed_characters_equal_whole_string() {
    let input = r#""a\tb 😊 c""#;
    let mut node = load(doc(input)).unwrap();
    let streamed: String = node
        .chars()
        .unwrap()
        .collect::<Result<String, _>>()
        .unwrap();
    let mut again = load(doc(input)).unwrap();
    assert_eq!(again.decode().unwrap(), Value::Str(streamed));
}
