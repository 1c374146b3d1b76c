//! Purpose: Lock parser contract expectations with corpus + differential coverage.
//! Exports: Integration tests only (no runtime exports).
//! Role: Catch semantic drift between the compact (simd-json) and reference (serde_json) backends.
//! Invariants: Differential checks assert parity where behavior should match today.
//! Invariants: Known engine divergences are asserted explicitly so a change is noticed.
use xson::core::error::ErrorKind;
use xson::json::{Compact, Json, Reference, equivalent};

fn assert_differential_parity(input: &str) {
    let compact = Compact::parse(input);
    let reference = Reference::parse(input);
    match (compact, reference) {
        (Ok(a), Ok(b)) => {
            assert!(equivalent(&a, &b), "parser value mismatch for {input}");
            assert_eq!(a.serialize(false), b.serialize(false), "rendering mismatch for {input}");
        }
        (Err(a), Err(b)) => {
            assert_eq!(a.kind(), ErrorKind::Parse);
            assert_eq!(b.kind(), ErrorKind::Parse);
        }
        (left, right) => {
            panic!("parser outcome mismatch for {input}: compact={left:?}, reference={right:?}")
        }
    }
}

#[test]
fn corpus_valid_payloads_match() {
    let corpus = [
        r#"{"a":1,"b":"ok"}"#,
        r#"[1,2,3,{"x":true}]"#,
        r#"{"nested":{"arr":[{"k":"v"}]}}"#,
        r#"{"unicode":"☃","escaped":"tab\tquote\""}"#,
        r#"  {"padded" : [ 1 , 2 ] }  "#,
        r#"[-0.5,1e3,12345678901234]"#,
        "null",
        "\"bare string\"",
    ];

    for case in corpus {
        assert_differential_parity(case);
    }
}

#[test]
fn corpus_malformed_payloads_rejected_by_both() {
    let corpus = [
        "",
        "{",
        r#"{"a":}"#,
        r#"{"a":1,}"#,
        "[1 2]",
        "tru",
        r#"{"a":1} trailing"#,
        "'single'",
    ];

    for case in corpus {
        assert_differential_parity(case);
    }
}

#[test]
fn parse_errors_locate_the_failure() {
    let input = "{\n  \"a\": 1,\n  \"b\": ?\n}";
    for err in [
        Compact::parse(input).expect_err("compact rejects"),
        Reference::parse(input).expect_err("reference rejects"),
    ] {
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.input(), Some(input));
        let line = err.line().expect("line");
        assert!((1..=4).contains(&line), "line {line}");
        let offset = err.offset().expect("offset");
        assert!(offset <= input.len());
        assert!(err.hint().is_some_and(|hint| hint.starts_with("parse category: ")));
    }
}

#[test]
fn corpus_duplicate_keys_are_accepted() {
    let input = r#"{"a":1,"a":2}"#;
    let reference = Reference::parse(input).expect("reference accepts duplicates");
    assert!(reference.at("a").expect("member").equals(&2));
    let compact = Compact::parse(input).expect("compact accepts duplicates");
    assert!(compact.contains("a"));
}

#[test]
fn corpus_deep_nesting_diverges() {
    let depth = 256usize;
    let mut payload = String::with_capacity(depth * 2 + 1);
    for _ in 0..depth {
        payload.push('[');
    }
    payload.push('0');
    for _ in 0..depth {
        payload.push(']');
    }
    assert!(
        Compact::parse(&payload).is_ok(),
        "compact backend unexpectedly rejected deep nesting"
    );
    let err = Reference::parse(&payload).expect_err("reference recursion limit");
    assert_eq!(err.hint(), Some("parse category: depth-limit"));
}

#[test]
fn corpus_large_number_edges() {
    assert_differential_parity(r#"{"n":18446744073709551615}"#);

    let above_u64 = r#"{"n":18446744073709551616}"#;
    assert!(
        Compact::parse(above_u64).is_err(),
        "compact backend unexpectedly accepted u64+1 integer"
    );
    assert!(
        Reference::parse(above_u64).is_ok(),
        "reference backend unexpectedly rejected u64+1 integer"
    );

    assert_differential_parity(r#"{"n":1e309}"#);
}
