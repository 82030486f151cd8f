//! Catalog of standard cuts, organized by run period
//!
//! Each run period has its own module, with one builder function per cut and
//! per cut set. Later periods reuse the definitions of earlier ones through
//! re-exports, and derive their cut sets by splicing the member lists of
//! earlier cut sets.
//!
//! Cut sets can also be built by name through the [registry](cut_sets).

pub mod postsr1;
pub mod sciencerun0;
pub mod sciencerun1;
pub mod sciencerun2;

use crate::{
    composite::CompositeCut,
    config::Configuration,
    error::{CutError, Result},
    numeric::Float,
};

use log::debug;

/// Signature of cut set builders
pub type BuildFn = fn(&Configuration) -> Result<CompositeCut>;

/// A registered cut set
#[derive(Debug, Clone, Copy)]
pub struct CutSetEntry {
    /// Run period the cut set belongs to, named after its module
    pub context: &'static str,

    /// Cut set name, without the `Cut` prefix
    pub name: &'static str,

    /// Builder function
    pub build: BuildFn,
}

macro_rules! entries {
    ($($context:ident :: $builder:ident => $name:literal),* $(,)?) => {
        &[$(CutSetEntry {
            context: stringify!($context),
            name: $name,
            build: $context::$builder,
        }),*]
    };
}

const CUT_SETS: &[CutSetEntry] = entries![
    sciencerun0::all_energy => "AllEnergy",
    sciencerun0::low_energy => "LowEnergy",
    sciencerun1::all_energy => "AllEnergy",
    sciencerun1::low_energy_rn220 => "LowEnergyRn220",
    sciencerun1::low_energy_ambe => "LowEnergyAmBe",
    sciencerun1::low_energy_ng => "LowEnergyNG",
    postsr1::all_energy => "AllEnergy",
    postsr1::low_energy_rn220 => "LowEnergyRn220",
    postsr1::low_energy_ambe => "LowEnergyAmBe",
    postsr1::low_energy_ng => "LowEnergyNG",
    sciencerun2::all_energy => "AllEnergy",
    sciencerun2::low_energy_rn220 => "LowEnergyRn220",
    sciencerun2::low_energy_ambe => "LowEnergyAmBe",
    sciencerun2::low_energy_ng => "LowEnergyNG",
];

/// All registered cut sets, run period by run period
pub fn cut_sets() -> &'static [CutSetEntry] {
    CUT_SETS
}

/// Find a registered cut set
pub fn lookup(context: &str, name: &str) -> Result<&'static CutSetEntry> {
    CUT_SETS
        .iter()
        .find(|entry| entry.context == context && entry.name == name)
        .ok_or_else(|| CutError::UnknownCutSet {
            context: context.to_owned(),
            name: name.to_owned(),
        })
}

/// Build a registered cut set by name
pub fn build(context: &str, name: &str, cfg: &Configuration) -> Result<CompositeCut> {
    let entry = lookup(context, name)?;
    debug!("Building cut set {context}/{name}");
    (entry.build)(cfg)
}

/// Expression of the distance from an event to a calibration source
fn distance_to_source(source: [Float; 3]) -> String {
    let [sx, sy, sz] = source;
    format!("sqrt(({sx} - x) ** 2 + ({sy} - y) ** 2 + ({sz} - z) ** 2)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cut::Cut, expr::Expression, table::EventTable};

    #[test]
    fn every_cut_set_builds() {
        let cfg = Configuration::default();
        for entry in cut_sets() {
            let set = (entry.build)(&cfg).unwrap();
            assert_eq!(set.name(), format!("Cut{}", entry.name));
            assert!(!set.members().is_empty(), "{}/{}", entry.context, entry.name);
        }
    }

    #[test]
    fn lookup_by_name() {
        let cfg = Configuration::default();
        let set = build("sciencerun1", "LowEnergyNG", &cfg).unwrap();
        assert_eq!(set.member_names()[0], "CutNGFiducial");
        assert!(matches!(
            build("sciencerun0", "LowEnergyBackground", &cfg),
            Err(CutError::UnknownCutSet { .. })
        ));
        assert!(lookup("sciencerun3", "AllEnergy").is_err());
    }

    #[test]
    fn source_distance() {
        let table = EventTable::from_columns([
            ("x", vec![1., 4.]),
            ("y", vec![2., 2.]),
            ("z", vec![-50., -46.]),
        ])
        .unwrap();
        let expr = Expression::parse(&distance_to_source([1., 2., -50.])).unwrap();
        assert_eq!(
            expr.evaluate(&table).unwrap(),
            crate::table::Column::Float(vec![0., 5.])
        );
    }
}
