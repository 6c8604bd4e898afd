mod common;

use common::pinned_generator;
use fixture_forge::content::padding::fill_with_padding;
use fixture_forge::{GenerationRequest, SizeSpec, SizeUnit};
use proptest::prelude::*;

fn unit() -> impl Strategy<Value = SizeUnit> {
    prop_oneof![
        Just(SizeUnit::Byte),
        Just(SizeUnit::Kibibyte),
        Just(SizeUnit::Mebibyte),
        Just(SizeUnit::Gibibyte),
    ]
}

fn csv_rows(target: u64) -> usize {
    let out = pinned_generator()
        .generate_request(&GenerationRequest::new("r.csv", SizeSpec::bytes(target)))
        .unwrap();
    out.bytes.iter().filter(|b| **b == b'\n').count()
}

proptest! {
    #[test]
    fn resolver_floors_magnitude_times_multiplier(magnitude in 0.0f64..1.0e6, unit in unit()) {
        let expected = (magnitude * unit.multiplier() as f64).floor() as u64;
        prop_assert_eq!(SizeSpec::parse(&magnitude.to_string(), unit).resolve(), expected);
    }

    #[test]
    fn non_numeric_magnitudes_resolve_to_zero(magnitude in "[a-zA-Z ]*", unit in unit()) {
        prop_assert_eq!(SizeSpec::parse(&magnitude, unit).resolve(), 0);
    }

    #[test]
    fn padding_runs_respect_the_chunk_cap(target in 0u64..50_000, chunk in 1usize..5_000) {
        let mut total = 0u64;
        fill_with_padding(target, chunk, |run| {
            assert!(run.chars().count() <= chunk);
            total += run.len() as u64;
            Ok(())
        })
        .unwrap();
        prop_assert!(total <= target);
        prop_assert!(target - total < 3);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn json_is_always_valid(target in 0u64..300_000) {
        let out = pinned_generator()
            .generate_request(&GenerationRequest::new("d.json", SizeSpec::bytes(target)))
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out.bytes).unwrap();
        prop_assert_eq!(value["metadata"]["targetSize"].as_u64(), Some(target));
        if target >= 12_000 {
            prop_assert_eq!(out.actual_byte_length, target);
        }
    }

    #[test]
    fn csv_row_count_is_monotonic(a in 0u64..120_000, b in 0u64..120_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(csv_rows(lo) <= csv_rows(hi));
    }
}
