//! End-to-end behaviour of cuts and cut sets, as seen by analysis code

use lax::{
    catalog, variables, Column, CompositeCut, Configuration, Cut, CutError, EventTable,
    ExpressionCut, RangeCut, Version,
};

/// Five synthetic events with known cS1 and S2
fn events() -> EventTable {
    EventTable::from_columns([
        ("cs1", vec![10., 250., 150., 0., 199.]),
        ("s2", vec![1000., 2000., 120., 300., 150.]),
    ])
    .unwrap()
}

fn two_range_cuts() -> CompositeCut {
    CompositeCut::new("Selection", 0)
        .push(RangeCut::new("A", 0).variable("cs1").allowed_range(0., 200.))
        .push(RangeCut::new("B", 0).variable("s2").allowed_range(150., f64::INFINITY))
}

#[test]
fn composite_of_two_range_cuts() {
    let mut table = events();
    two_range_cuts().run(&mut table).unwrap();

    let a = [true, false, true, false, true];
    let b = [true, true, false, true, false];
    assert_eq!(table.bools("CutA").unwrap(), &a);
    assert_eq!(table.bools("CutB").unwrap(), &b);
    let expected: Vec<bool> = a.iter().zip(&b).map(|(&a, &b)| a && b).collect();
    assert_eq!(table.bools("CutSelection").unwrap(), &expected[..]);
    assert_eq!(table.count_true("CutSelection").unwrap(), 1);
}

#[test]
fn rows_are_never_dropped_or_reordered() {
    let mut table = events();
    let before = table.column("cs1").unwrap().clone();
    two_range_cuts().run(&mut table).unwrap();
    assert_eq!(table.num_rows(), 5);
    assert_eq!(table.column("cs1").unwrap(), &before);
    assert!(!table.contains("temp"));
}

#[test]
fn rerunning_overwrites_with_identical_results() {
    let mut table = events();
    let cut = two_range_cuts();
    cut.run(&mut table).unwrap();
    let first = table.column("CutSelection").unwrap().clone();
    let num_columns = table.num_columns();

    cut.run(&mut table).unwrap();
    assert_eq!(table.column("CutSelection").unwrap(), &first);
    assert_eq!(table.num_columns(), num_columns);
}

#[test]
fn derived_cut_set_overrides_and_appends() {
    let base = CompositeCut::new("Base", 0)
        .push(ExpressionCut::new("M0", 0, "cs1 > 0").unwrap())
        .push(ExpressionCut::new("M1", 0, "s2 > 100").unwrap())
        .push(ExpressionCut::new("M2", 0, "cs1 < 200").unwrap());
    let derived = base
        .into_variant("Derived")
        .replace_at(1, ExpressionCut::new("M1", 1, "s2 > 500").unwrap())
        .unwrap()
        .push(ExpressionCut::new("M3", 0, "s2 < 1500").unwrap());

    assert_eq!(
        derived.member_names(),
        ["CutM0", "CutM1", "CutM2", "CutM3"]
    );
    assert_eq!(derived.members()[1].version(), Version::Integer(1));

    let mut table = events();
    derived.run(&mut table).unwrap();
    assert_eq!(
        table.bools("CutM1").unwrap(),
        &[true, true, false, false, false]
    );
    assert_eq!(
        table.bools("CutDerived").unwrap(),
        &[true, false, false, false, false]
    );
}

#[test]
fn unconfigured_range_cut_is_an_error() {
    let mut table = events();
    let cut = RangeCut::new("Half", 0).variable("cs1");
    assert!(matches!(
        cut.run(&mut table),
        Err(CutError::NotConfigured { .. })
    ));
    assert!(!table.contains("CutHalf"));
}

#[test]
fn registry_covers_every_run_period() {
    let cfg = Configuration::default();
    let contexts: Vec<_> = catalog::cut_sets().iter().map(|e| e.context).collect();
    for context in ["sciencerun0", "sciencerun1", "postsr1", "sciencerun2"] {
        assert!(contexts.contains(&context), "{context}");
    }
    for entry in catalog::cut_sets() {
        let set = (entry.build)(&cfg).unwrap();
        assert_eq!(set.version(), Version::LIBRARY);
        for member in set.members() {
            assert!(member.name().starts_with("Cut"), "{}", member.name());
        }
    }
}

#[test]
fn catalog_member_on_its_own() {
    let mut table = EventTable::from_columns([("cs1", vec![-1., 0., 1., 200.])]).unwrap();
    let cut = catalog::sciencerun1::interaction_exists().unwrap();
    cut.run(&mut table).unwrap();
    assert_eq!(
        table.bools("CutInteractionExists").unwrap(),
        &[false, false, true, true]
    );
}

#[test]
fn variables_reduce_tables() {
    let table = EventTable::from_columns([
        ("r", vec![10., 60., 20.]),
        ("z", vec![-50., -50., 5.]),
        ("s1", vec![20., 20., 20.]),
        ("s2", vec![500., 500., 500.]),
        ("cs2", vec![1., 2., 3.]),
    ])
    .unwrap();
    let essentials = variables::get_variables(false);
    let reduced = variables::reduce(&table, essentials, true).unwrap();
    assert_eq!(reduced.num_rows(), 1);
    assert_eq!(reduced.num_columns(), essentials.len());
    assert_eq!(reduced.column("r").unwrap(), &Column::Float(vec![10.]));
    assert!(!reduced.contains("cs2"));
}
