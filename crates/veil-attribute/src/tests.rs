//! Lattice-law tests across all attribute types.
//!
//! Property-based checks of the contracts every type must uphold:
//! covering generalization, partial-order `subset_of`, idempotent
//! aggregates, split size guarantees, and parse/show round-trips for
//! concrete values.

use proptest::prelude::*;
use test_case::test_case;

use crate::{
    AttributeValue, DateAttribute, EnumAttribute, HierarchicAttribute, Hierarchy, IntAttribute,
    IntValue, QuasiType, StringAttribute,
};

fn int_type() -> QuasiType {
    QuasiType::Int(IntAttribute::new(0, 1_000_000))
}

fn enum_type() -> QuasiType {
    QuasiType::Enum(EnumAttribute::new(
        "Job",
        vec!["engineer".into(), "teacher".into(), "nurse".into(), "clerk".into()],
    ))
}

fn hierarchy_type() -> QuasiType {
    let mut tree = Hierarchy::new("region");
    let eu = tree.add_child(tree.root(), "europe");
    tree.add_child(eu, "hungary");
    tree.add_child(eu, "austria");
    let am = tree.add_child(tree.root(), "america");
    tree.add_child(am, "canada");
    tree.add_child(am, "brazil");
    QuasiType::Hierarchy(HierarchicAttribute::new("Region", tree))
}

proptest! {
    // ========================================================================
    // Generalization covers every member
    // ========================================================================

    /// The aggregate of any int value set covers all members.
    #[test]
    fn int_generalization_covers(values in prop::collection::vec(0i64..=1_000_000, 1..20)) {
        let ty = int_type();
        let vs: Vec<AttributeValue> = values.iter().map(|&v| AttributeValue::Int(IntValue::Simple(v))).collect();
        let agg = ty.smallest_generalization(&vs);
        for v in &vs {
            prop_assert!(ty.subset_of(&agg, v));
        }
    }

    /// A singleton set generalizes to the member itself.
    #[test]
    fn int_singleton_generalization_is_identity(v in 0i64..=1_000_000) {
        let ty = int_type();
        let value = AttributeValue::Int(IntValue::Simple(v));
        let agg = ty.smallest_generalization(std::slice::from_ref(&value));
        prop_assert_eq!(agg, value);
    }

    /// Generalizing an aggregate together with itself is a fixed point.
    #[test]
    fn int_generalization_is_idempotent(values in prop::collection::vec(0i64..=1_000_000, 1..20)) {
        let ty = int_type();
        let vs: Vec<AttributeValue> = values.iter().map(|&v| AttributeValue::Int(IntValue::Simple(v))).collect();
        let agg = ty.smallest_generalization(&vs);
        let again = ty.smallest_generalization(&[agg.clone(), agg.clone()]);
        prop_assert_eq!(again, agg);
    }

    /// subset_of is reflexive on arbitrary ranges.
    #[test]
    fn int_subset_reflexive(lo in 0i64..=1_000_000, extent in 0i64..1000) {
        let ty = int_type();
        let v = if extent == 0 {
            AttributeValue::Int(IntValue::Simple(lo))
        } else {
            AttributeValue::Int(IntValue::Range(lo, (lo + extent).min(1_000_000)))
        };
        prop_assert!(ty.subset_of(&v, &v));
    }

    /// subset_of is transitive along nested ranges.
    #[test]
    fn int_subset_transitive(v in 100i64..1000, grow_a in 1i64..50, grow_b in 1i64..50) {
        let ty = int_type();
        let x = AttributeValue::Int(IntValue::Simple(v));
        let y = AttributeValue::Int(IntValue::Range(v - grow_a, v + grow_a));
        let z = AttributeValue::Int(IntValue::Range(v - grow_a - grow_b, v + grow_a + grow_b));
        prop_assert!(ty.subset_of(&y, &x));
        prop_assert!(ty.subset_of(&z, &y));
        prop_assert!(ty.subset_of(&z, &x));
    }

    /// subset_of is antisymmetric: two ranges covering each other are the
    /// same range.
    #[test]
    fn int_subset_antisymmetric(
        lo_a in 0i64..1000, extent_a in 0i64..100,
        lo_b in 0i64..1000, extent_b in 0i64..100,
    ) {
        let ty = int_type();
        let range = |lo: i64, extent: i64| {
            if extent == 0 {
                AttributeValue::Int(IntValue::Simple(lo))
            } else {
                AttributeValue::Int(IntValue::Range(lo, lo + extent))
            }
        };
        let a = range(lo_a, extent_a);
        let b = range(lo_b, extent_b);
        if ty.subset_of(&a, &b) && ty.subset_of(&b, &a) {
            prop_assert_eq!(a, b);
        }
    }

    // ========================================================================
    // Split guarantees
    // ========================================================================

    /// A successful int split never leaves either side below k, and a
    /// value set smaller than 2k never splits.
    #[test]
    fn int_split_size_guarantees(
        values in prop::collection::vec(0i64..=1_000_000, 1..40),
        k in 1usize..6,
    ) {
        let ty = int_type();
        let vs: Vec<AttributeValue> = values.iter().map(|&v| AttributeValue::Int(IntValue::Simple(v))).collect();
        let partition = ty.partition(vs);
        let result = ty.try_split(&partition, k);
        if partition.len() < 2 * k {
            prop_assert!(result.is_none());
        }
        if let Some((left, right)) = result {
            prop_assert!(left.len() >= k);
            prop_assert!(right.len() >= k);
            prop_assert_eq!(left.len() + right.len(), partition.len());
            // Disjoint index cover.
            let mut seen = vec![false; partition.len()];
            for &i in left.iter().chain(right.iter()) {
                prop_assert!(!seen[i]);
                seen[i] = true;
            }
        }
    }

    /// Enum splits obey the same size guarantees.
    #[test]
    fn enum_split_size_guarantees(
        picks in prop::collection::vec(0usize..4, 1..30),
        k in 1usize..5,
    ) {
        let ty = enum_type();
        let QuasiType::Enum(attr) = &ty else { unreachable!() };
        let names: Vec<String> = attr.declared().to_vec();
        let vs: Vec<AttributeValue> = picks
            .iter()
            .map(|&i| ty.parse(&names[i]).unwrap())
            .collect();
        let partition = ty.partition(vs);
        if let Some((left, right)) = ty.try_split(&partition, k) {
            prop_assert!(left.len() >= k);
            prop_assert!(right.len() >= k);
            prop_assert_eq!(left.len() + right.len(), partition.len());
        }
    }

    // ========================================================================
    // Round-trips for concrete values
    // ========================================================================

    /// parse(show(v)) reproduces any concrete int value.
    #[test]
    fn int_round_trip(v in 0i64..=1_000_000) {
        let ty = int_type();
        let value = ty.parse(&v.to_string()).unwrap();
        prop_assert_eq!(ty.parse(&ty.show(&value)).unwrap(), value);
    }

    /// parse(show(v)) reproduces any concrete string value.
    #[test]
    fn string_round_trip(s in "[a-zA-Z]{1,12}") {
        let ty = QuasiType::Text(StringAttribute::new(1, 12));
        let value = ty.parse(&s).unwrap();
        prop_assert_eq!(ty.parse(&ty.show(&value)).unwrap(), value);
    }
}

// ============================================================================
// Table-driven round-trips for the remaining types
// ============================================================================

#[test_case("engineer")]
#[test_case("teacher")]
#[test_case("nurse")]
fn enum_round_trip(name: &str) {
    let ty = enum_type();
    let value = ty.parse(name).unwrap();
    assert_eq!(ty.parse(&ty.show(&value)).unwrap(), value);
}

#[test_case("hungary")]
#[test_case("europe")]
#[test_case("region")]
fn hierarchy_round_trip(name: &str) {
    let ty = hierarchy_type();
    let value = ty.parse(name).unwrap();
    assert_eq!(ty.parse(&ty.show(&value)).unwrap(), value);
}

#[test_case("2001-05-20")]
#[test_case("1999-12-31")]
fn date_round_trip(text: &str) {
    let ty = QuasiType::Date(DateAttribute::default());
    let value = ty.parse(text).unwrap();
    assert_eq!(ty.parse(&ty.show(&value)).unwrap(), value);
}

#[test]
fn generalization_of_pair_covers_both() {
    let ty = hierarchy_type();
    let a = ty.parse("hungary").unwrap();
    let b = ty.parse("canada").unwrap();
    let agg = ty.smallest_generalization(&[a.clone(), b.clone()]);
    assert!(ty.subset_of(&agg, &a));
    assert!(ty.subset_of(&agg, &b));
}

#[test]
fn singleton_partition_costs_nothing() {
    for ty in [int_type(), enum_type(), hierarchy_type()] {
        let value = match &ty {
            QuasiType::Int(_) => ty.parse("42").unwrap(),
            QuasiType::Enum(_) => ty.parse("nurse").unwrap(),
            QuasiType::Hierarchy(_) => ty.parse("brazil").unwrap(),
            _ => unreachable!(),
        };
        let partition = ty.partition(vec![value]);
        assert_eq!(ty.error_cost(&partition), 0.0);
    }
}

#[test]
fn merging_more_values_costs_more() {
    let ty = int_type();
    let narrow = ty.partition(vec![
        ty.parse("40").unwrap(),
        ty.parse("42").unwrap(),
    ]);
    let wide = ty.partition(vec![
        ty.parse("40").unwrap(),
        ty.parse("42").unwrap(),
        ty.parse("100").unwrap(),
    ]);
    assert!(ty.error_cost(&narrow) > 0.0);
    assert!(ty.error_cost(&wide) > ty.error_cost(&narrow));
}
