//! Cuts for the second science run (SR1)
//!
//! Most definitions carry over from SR0 unchanged. Calibration cut sets use
//! fiducial volumes centered on the neutron source that was deployed.

use super::distance_to_source;
use crate::{
    composite::CompositeCut, config::Configuration, cut::Version, error::Result,
    expression::ExpressionCut, numeric::Float,
};

pub use super::sciencerun0::{
    daq_veto, fiducial_cylinder_1t, interaction_exists, interaction_peaks_biggest,
    s1_area_fraction_top, s1_low_energy_range, s1_max_pmt, s1_pattern_likelihood,
    s1_single_scatter, s2_area_fraction_top, s2_single_scatter, s2_single_scatter_simple,
    s2_threshold, s2_width, S2_AREA_FRACTION_TOP_VERSION,
};

/// Cuts applicable at low and high energy (gammas)
pub fn all_energy(cfg: &Configuration) -> Result<CompositeCut> {
    Ok(CompositeCut::new("AllEnergy", Version::LIBRARY)
        .with_doc("Cuts applicable at low and high energy, mostly a subset of the low energy cuts")
        .push(fiducial_cylinder_1t()?)
        .push(interaction_exists()?)
        .push(s2_threshold()?)
        .push(interaction_peaks_biggest()?)
        .push(s2_area_fraction_top(S2_AREA_FRACTION_TOP_VERSION)?)
        .push(s2_single_scatter()?)
        .push(daq_veto()?)
        .push(s1_single_scatter(cfg))
        .push(s1_area_fraction_top(cfg)))
}

/// Rn220 calibration events with cS1 < 200 PE, used to calibrate the ER band
/// in the region of interest
pub fn low_energy_rn220(cfg: &Configuration) -> Result<CompositeCut> {
    Ok(all_energy(cfg)?
        .into_variant("LowEnergyRn220")
        .with_doc("Rn220 calibration events with cS1 < 200 PE")
        .replace_at(1, s1_low_energy_range())?
        .replace_at(5, s2_single_scatter_simple()?)?
        .push(s1_pattern_likelihood()?)
        .push(s2_width(cfg))
        .push(s1_max_pmt()?))
}

/// AmBe calibration events with cS1 < 200 PE
pub fn low_energy_ambe(cfg: &Configuration) -> Result<CompositeCut> {
    low_energy_rn220(cfg)?
        .into_variant("LowEnergyAmBe")
        .with_doc("AmBe calibration events with cS1 < 200 PE")
        .replace_at(0, ambe_fiducial()?)
}

/// Neutron generator calibration events with cS1 < 200 PE
pub fn low_energy_ng(cfg: &Configuration) -> Result<CompositeCut> {
    low_energy_rn220(cfg)?
        .into_variant("LowEnergyNG")
        .with_doc("Neutron generator calibration events with cS1 < 200 PE")
        .replace_at(0, ng_fiducial()?)
}

/// Position of the AmBe source during SR1, at the first I-belt position (cm)
pub const AMBE_SOURCE_POSITION: [Float; 3] = [97., 43.5, -50.];

/// Position of the neutron generator (cm)
pub const NG_SOURCE_POSITION: [Float; 3] = [31.6, 86.8, -50.];

/// Fiducial volume around a neutron source
///
/// Same depth range as the fiducial cylinder with a wider radius, to keep as
/// many nuclear recoils as possible, and a maximal distance to the source, to
/// cut away background ERs.
///
fn source_fiducial(
    identifier: &str,
    version: i32,
    source: [Float; 3],
    max_distance: Float,
) -> Result<ExpressionCut> {
    ExpressionCut::new(
        identifier,
        version,
        &format!(
            "(distance_to_source < {max_distance}) & (-92.9 < z) & (z < -9) \
             & (sqrt(x*x + y*y) < 42.00)"
        ),
    )?
    .derive("distance_to_source", &distance_to_source(source))
}

/// Fiducial volume for AmBe calibration
///
/// Computes `distance_to_source` (cm).
///
pub fn ambe_fiducial() -> Result<ExpressionCut> {
    source_fiducial("AmBeFiducial", 2, AMBE_SOURCE_POSITION, 103.5)
}

/// Fiducial volume for neutron generator calibration
///
/// Computes `distance_to_source` (cm).
///
pub fn ng_fiducial() -> Result<ExpressionCut> {
    source_fiducial("NGFiducial", 0, NG_SOURCE_POSITION, 111.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cut::Cut, table::EventTable};

    #[test]
    fn calibration_sets_swap_the_fiducial_volume() {
        let cfg = Configuration::default();
        let rn220 = low_energy_rn220(&cfg).unwrap();
        let ambe = low_energy_ambe(&cfg).unwrap();
        let ng = low_energy_ng(&cfg).unwrap();

        assert_eq!(rn220.member_names()[0], "CutFiducialCylinder1T");
        assert_eq!(ambe.member_names()[0], "CutAmBeFiducial");
        assert_eq!(ng.member_names()[0], "CutNGFiducial");
        assert_eq!(ambe.member_names()[1..], rn220.member_names()[1..]);
        assert_eq!(ng.name(), "CutLowEnergyNG");
        assert_eq!(ambe.members()[0].version(), Version::Integer(2));
    }

    #[test]
    fn ambe_fiducial_volume() {
        let mut table = EventTable::from_columns([
            ("x", vec![37., 0., 0., 41.]),
            ("y", vec![0., 0., 0., 10.]),
            ("z", vec![-50., -50., -95., -50.]),
        ])
        .unwrap();
        ambe_fiducial().unwrap().run(&mut table).unwrap();
        // On the TPC axis, events are ~106 cm away from the source
        assert_eq!(
            table.bools("CutAmBeFiducial").unwrap(),
            &[true, false, false, false]
        );
    }
}
