//! Property tests for fingerprint stability and normalization

use proptest::prelude::*;

use gridboard_core::fingerprint::fingerprint_of;
use gridboard_core::model::{ExecutionDefinition, Measure};
use gridboard_core_types::ObjRef;

fn measure_strategy() -> impl Strategy<Value = Measure> {
    ("[a-z]{1,8}", "[a-z.]{1,12}", any::<bool>()).prop_map(|(local_id, item, compute_ratio)| {
        let mut measure = Measure::simple(local_id, ObjRef::identifier(item));
        measure.compute_ratio = compute_ratio;
        measure
    })
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(measure in measure_strategy()) {
        let a = fingerprint_of(&measure).unwrap();
        let b = fingerprint_of(&measure.clone()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_is_a_sha256_hex_digest(measure in measure_strategy()) {
        let fp = fingerprint_of(&measure).unwrap();
        prop_assert_eq!(fp.as_str().len(), 64);
        prop_assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_distinguishes_measure_items(measure in measure_strategy()) {
        // The strategy only produces identifier refs, so a URI ref always differs
        let mut other = measure.clone();
        other.item = ObjRef::uri("/gdc/md/other");
        prop_assert_ne!(
            fingerprint_of(&measure).unwrap(),
            fingerprint_of(&other).unwrap()
        );
    }

    #[test]
    fn explicit_defaults_match_omitted_fields(local_id in "[a-z]{1,8}") {
        let omitted = Measure::simple(local_id.as_str(), ObjRef::identifier("fact.amount"));
        let explicit = Measure {
            local_id,
            item: ObjRef::identifier("fact.amount"),
            aggregation: None,
            compute_ratio: false,
            filters: Vec::new(),
        };
        prop_assert_eq!(
            fingerprint_of(&omitted).unwrap(),
            fingerprint_of(&explicit).unwrap()
        );
    }

    #[test]
    fn equal_definitions_share_a_fingerprint(
        measures in proptest::collection::vec(measure_strategy(), 0..4)
    ) {
        let a = ExecutionDefinition {
            measures: measures.clone(),
            ..Default::default()
        };
        let b = ExecutionDefinition {
            measures,
            ..Default::default()
        };
        prop_assert_eq!(fingerprint_of(&a).unwrap(), fingerprint_of(&b).unwrap());
    }

    #[test]
    fn measure_order_is_significant(
        measures in proptest::collection::vec(measure_strategy(), 2..4)
    ) {
        let mut reversed = measures.clone();
        reversed.reverse();
        prop_assume!(measures != reversed);

        let a = ExecutionDefinition {
            measures,
            ..Default::default()
        };
        let b = ExecutionDefinition {
            measures: reversed,
            ..Default::default()
        };
        prop_assert_ne!(fingerprint_of(&a).unwrap(), fingerprint_of(&b).unwrap());
    }
}
