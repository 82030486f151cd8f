//! Cuts for analyses done after SR1
//!
//! All SR1 cuts and cut sets carry over, new cuts are added below.

use crate::{error::Result, expression::ExpressionCut};

pub use super::sciencerun1::*;

/// Preselection of the ER band for the double electron capture analysis
///
/// Computes `log_cs_ratio`, the decimal log of cS2/cS1. Not meant for low
/// energies (cS1 < 200 PE).
///
pub fn er_band_dec() -> Result<ExpressionCut> {
    ExpressionCut::new("ERBandDEC", 1, "1 < log_cs_ratio < 2")?
        .derive("log_cs_ratio", "log10(cs2 / cs1)")
}
