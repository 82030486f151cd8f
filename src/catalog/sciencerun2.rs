//! Cuts for the third science run (SR2)
//!
//! The single scatter cut is replaced by a pattern-based one, the S2 width
//! cut becomes part of the high energy selection, and the fiducial volume is
//! left to the analysis.

use crate::{
    composite::CompositeCut,
    config::Configuration,
    cut::Version,
    error::Result,
    expression::ExpressionCut,
};

pub use super::{
    sciencerun0::{
        daq_veto, fiducial_cylinder_1t, interaction_exists, interaction_peaks_biggest,
        s1_area_fraction_top, s1_low_energy_range, s1_max_pmt, s1_pattern_likelihood,
        s2_single_scatter_simple, s2_threshold, s2_width,
    },
    sciencerun1::s1_single_scatter,
};

// ### CUT SETS ###

/// Cuts applicable at low and high energy (gammas)
pub fn all_energy(cfg: &Configuration) -> Result<CompositeCut> {
    Ok(CompositeCut::new("AllEnergy", Version::LIBRARY)
        .with_doc("Cuts applicable at low and high energy, mostly a subset of the low energy cuts")
        .push(interaction_exists()?)
        .push(s2_threshold()?)
        .push(interaction_peaks_biggest()?)
        .push(s2_single_scatter()?)
        .push(s2_width(cfg))
        .push(daq_veto()?)
        .push(s1_single_scatter(cfg)))
}

/// Rn220 calibration events with cS1 < 200 PE
pub fn low_energy_rn220(cfg: &Configuration) -> Result<CompositeCut> {
    Ok(all_energy(cfg)?
        .into_variant("LowEnergyRn220")
        .with_doc("Rn220 calibration events with cS1 < 200 PE")
        // Energy window is tighter than the mere existence of an interaction
        .replace("CutInteractionExists", s1_low_energy_range())?
        .replace("CutS2SingleScatter", s2_single_scatter_simple()?)?
        // Cuts which are not tuned at high energy yet
        .push(s1_pattern_likelihood()?)
        .push(s1_max_pmt()?)
        .push(s1_area_fraction_top(cfg)))
}

/// AmBe calibration events with cS1 < 200 PE
///
/// Same as [`low_energy_rn220`], without the cuts related to the Rn220
/// injection.
///
pub fn low_energy_ambe(cfg: &Configuration) -> Result<CompositeCut> {
    Ok(low_energy_rn220(cfg)?
        .into_variant("LowEnergyAmBe")
        .with_doc("AmBe calibration events with cS1 < 200 PE")
        .retain(|cut| !cut.name().contains("InjectionFraction")))
}

/// Neutron generator calibration events with cS1 < 200 PE, selected like
/// AmBe events
pub fn low_energy_ng(cfg: &Configuration) -> Result<CompositeCut> {
    Ok(low_energy_ambe(cfg)?
        .into_variant("LowEnergyNG")
        .with_doc("Neutron generator calibration events with cS1 < 200 PE"))
}

// ### SINGLE SCATTER ###

/// Rejects events whose largest other S2 has a hit pattern that fits better
/// than what electron pile-up would give
///
/// Other S2s within 10 µs after the main S1 are exempt, to keep alpha events,
/// and pile-up is left to [`interaction_peaks_biggest`]. Events without a
/// usable other S2 (NaN, or non-positive area or fit) pass.
///
pub fn s2_single_scatter() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S2SingleScatter",
        5,
        "~((largest_other_s2 > 0) & (largest_other_s2_pattern_fit > 0) \
           & ((largest_other_s2_delay_main_s1 < 0) | (largest_other_s2_delay_main_s1 > 10e3))) \
         | (largest_other_s2_pattern_fit > 0.856 * largest_other_s2 \
                                           - 47.8 * exp(-largest_other_s2 / 32.93))",
    )
}
