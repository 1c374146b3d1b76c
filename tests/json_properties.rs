//! Purpose: Property coverage for serialization and cross-backend transfer.
//! Exports: Integration tests only (no runtime exports).
//! Role: Generated documents exercise shapes the fixed-example suites never spell out.
//! Invariants: Generated floats are short dyadic fractions so both engines print them identically.
use proptest::prelude::*;
use xson::json::{Compact, Json, Reference, equivalent, transcode};

fn document() -> impl Strategy<Value = Reference> {
    let leaf = prop_oneof![
        Just(Reference::Null),
        any::<bool>().prop_map(Reference::from),
        any::<i64>().prop_map(Reference::from),
        any::<u64>().prop_map(Reference::from),
        (-1_000_000i64..1_000_000).prop_map(|n| Reference::from(n as f64 / 64.0)),
        "\\PC{0,8}".prop_map(Reference::from),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Reference::from),
            prop::collection::btree_map("\\PC{0,6}", inner, 0..5)
                .prop_map(|members| Reference::Object(members.into_iter().collect())),
        ]
    })
}

fn assert_round_trip<J: Json>(value: &J) -> Result<(), TestCaseError> {
    for pretty in [false, true] {
        let text = value.serialize(pretty);
        let reparsed = J::parse(&text)
            .map_err(|err| TestCaseError::fail(format!("own output rejected: {err}; {text}")))?;
        prop_assert!(equivalent(value, &reparsed), "pretty={}: {}", pretty, text);
        prop_assert_eq!(reparsed.serialize(false), value.serialize(false));
    }
    Ok(())
}

proptest! {
    #[test]
    fn reference_output_parses_back_to_the_same_document(value in document()) {
        assert_round_trip(&value)?;
    }

    #[test]
    fn compact_output_parses_back_to_the_same_document(value in document()) {
        let compact: Compact = transcode(&value);
        assert_round_trip(&compact)?;
    }

    #[test]
    fn transcode_is_lossless_both_ways(value in document()) {
        let compact: Compact = transcode(&value);
        prop_assert!(equivalent(&value, &compact));
        prop_assert_eq!(compact.serialize(false), value.serialize(false));

        let back: Reference = transcode(&compact);
        prop_assert_eq!(&back, &value);
    }

    #[test]
    fn both_engines_parse_the_same_text_alike(value in document()) {
        let text = value.serialize(false);
        let compact = Compact::parse(&text)
            .map_err(|err| TestCaseError::fail(format!("compact rejected: {err}; {text}")))?;
        prop_assert!(equivalent(&compact, &value));
        prop_assert_eq!(compact.serialize(false), text);
    }
}
