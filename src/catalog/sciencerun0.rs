//! Cuts for the first science run (SR0)
//!
//! Unless stated otherwise, events with a missing (NaN) input fail a cut.

use super::distance_to_source;
use crate::{
    composite::CompositeCut,
    config::Configuration,
    cut::{Cut, CutId, Version, TEMP_COLUMN},
    data::{self, RzMap},
    error::{CutError, Result},
    expression::ExpressionCut,
    numeric::{
        functions::{clip, hypot2},
        reals, Float,
    },
    range::RangeCut,
    scheduling::map_rows,
    stats::binom_test,
    table::EventTable,
};

use std::{collections::HashMap, path::PathBuf, sync::Arc};
use time::Duration;

// ### CUT SETS ###

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

/// Events with cS1 < 200 PE, as used for the dark matter search
pub fn low_energy(cfg: &Configuration) -> Result<CompositeCut> {
    Ok(all_energy(cfg)?
        .into_variant("LowEnergy")
        .with_doc("Events with cS1 < 200 PE, as used for the dark matter search")
        .replace_at(1, s1_low_energy_range())?
        .replace_at(5, s2_single_scatter_simple()?)?
        .push(s1_pattern_likelihood()?)
        .push(s2_width(cfg))
        .push(s1_max_pmt()?))
}

// ### LIVETIME CUTS ###

/// Time cut away at the end of each run
pub const END_OF_RUN_MARGIN: Duration = Duration::seconds(21);

/// Window after a busy-on signal during which events are vetoed, unless the
/// busy condition was lifted in the meantime
pub const BUSY_WINDOW: Duration = Duration::seconds(60);

/// No DAQ busy or high-energy veto during the event
///
/// Also requires the last busy signal to be an "off" one, and cuts the last
/// seconds of each run. Needs the proximity features (`nearest_busy`,
/// `previous_busy_on`...) and `run_number`.
///
/// Events with missing proximity information pass the busy-type check.
///
pub fn daq_veto() -> Result<CompositeCut> {
    Ok(CompositeCut::new("DAQVeto", 0)
        .with_doc("No DAQ busy or high-energy veto during the event")
        .push(EndOfRunCheck::new(END_OF_RUN_MARGIN))
        .push(ExpressionCut::new(
            "BusyTypeCheck",
            0,
            &format!(
                "~(previous_busy_on < {}) | (previous_busy_off < previous_busy_on)",
                BUSY_WINDOW.whole_nanoseconds()
            ),
        )?)
        .push(ExpressionCut::new(
            "BusyCheck",
            0,
            "abs(nearest_busy) > event_duration / 2",
        )?)
        .push(ExpressionCut::new(
            "HEVCheck",
            0,
            "abs(nearest_hev) > event_duration / 2",
        )?))
}

/// Rejects events too close to the end of their run
///
/// The end of a run is estimated as the time of its last event. Run numbers
/// are integers, events with a non-finite one fail.
///
#[derive(Debug, Clone)]
pub struct EndOfRunCheck {
    id: CutId,
    margin_ns: Float,
}
//
impl EndOfRunCheck {
    /// Reject events less than `margin` before the end of their run
    pub fn new(margin: Duration) -> Self {
        Self {
            id: CutId::new("EndOfRunCheck", 0),
            margin_ns: margin.whole_nanoseconds() as Float,
        }
    }
}
//
impl Cut for EndOfRunCheck {
    fn id(&self) -> &CutId {
        &self.id
    }

    fn evaluate(&self, table: &mut EventTable) -> Result<()> {
        let times = table.floats("event_time")?;
        let runs: Vec<Option<i64>> = table
            .floats("run_number")?
            .iter()
            .map(|&run| run.is_finite().then_some(run as i64))
            .collect();

        // Last event time of each run (NaN times are ignored by max)
        let mut run_ends = HashMap::<i64, Float>::new();
        for (run, &time) in runs.iter().zip(times) {
            if let Some(run) = *run {
                run_ends
                    .entry(run)
                    .and_modify(|end| *end = end.max(time))
                    .or_insert(time);
            }
        }

        // Events without a run number cannot be placed and fail
        let pass = map_rows(table.num_rows(), |row| {
            runs[row]
                .and_then(|run| run_ends.get(&run))
                .map_or(false, |&end| times[row] < end - self.margin_ns)
        });
        table.insert(self.id.name(), pass)
    }
}

// ### FIDUCIAL VOLUMES ###

/// Position of the AmBe source during SR0 (cm)
pub const AMBE_SOURCE_POSITION: [Float; 3] = [55.965311731903, 43.724893639103577, -50.];

/// One tonne fiducial cylinder, where the background distribution is flat
///
/// Also computes the radius `r` from `x` and `y`.
///
pub fn fiducial_cylinder_1t() -> Result<ExpressionCut> {
    Ok(ExpressionCut::new(
        "FiducialCylinder1T",
        2,
        "(-83.45 < z) & (z < -13.45) & (r < 39.85)",
    )?
    .derive("r", "sqrt(x * x + y * y)")?
    .with_doc("One tonne fiducial cylinder, defined on background run data"))
}

/// Events close enough to the AmBe source, to cut away background ERs
///
/// Computes `distance_to_source` (cm).
///
pub fn distance_to_ambe() -> Result<ExpressionCut> {
    Ok(ExpressionCut::new("DistanceToAmBe", 1, "distance_to_source < 80")?
        .derive("distance_to_source", &distance_to_source(AMBE_SOURCE_POSITION))?
        .with_doc("Distance to the AmBe source, for nuclear recoil calibration"))
}

// ### INTERACTION SELECTION ###

/// An S1 was paired with an S2
pub fn interaction_exists() -> Result<ExpressionCut> {
    ExpressionCut::new("InteractionExists", 0, "0 < cs1")
}

/// Main S1 and S2 are larger than any other S1 and S2
pub fn interaction_peaks_biggest() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "InteractionPeaksBiggest",
        0,
        "(s1 > largest_other_s1) & (s2 > largest_other_s2)",
    )
}

/// Low energy band, 0 < cS1 < 200 PE
pub fn s1_low_energy_range() -> RangeCut {
    RangeCut::new("S1LowEnergyRange", 0)
        .variable("cs1")
        .allowed_range(0., 200.)
        .with_doc("Low energy band")
}

/// S2 size above which the trigger is fully efficient
pub fn s2_threshold() -> Result<ExpressionCut> {
    ExpressionCut::new("S2Threshold", 0, "150 < s2")
}

// ### S1 QUALITY ###

/// Rejects S1s mostly seen by a single PMT (afterpulses, light emission)
///
/// 99% quantile of Rn220 calibration data.
///
pub fn s1_max_pmt() -> Result<ExpressionCut> {
    ExpressionCut::new("S1MaxPMT", 0, "s1_largest_hit_area < 0.052 * s1 + 4.15")
}

/// Rejects accidental coincidences of a lone S1 and a lone S2, using the
/// likelihood of the S1 hit pattern
///
/// 97% acceptance line of Rn220 calibration data.
///
pub fn s1_pattern_likelihood() -> Result<ExpressionCut> {
    ExpressionCut::new("S1PatternLikelihood", 0, "s1_pattern_fit < temp")?.derive(
        TEMP_COLUMN,
        "-2.39535 + 25.5857 * s1 ** 0.5 + 1.30652 * s1 - 0.0638579 * s1 ** 1.5",
    )
}

/// Rejects events where the second largest S1 could also form a valid
/// interaction with the main S2, as judged by the S2 width model
///
/// Needs `alt_s1_interaction_z`. Events without an alternative S1 (NaN) pass.
///
pub fn s1_single_scatter(cfg: &Configuration) -> S1SingleScatter {
    S1SingleScatter {
        id: CutId::new("S1SingleScatter", 1),
        model: S2WidthModel::new(cfg),
    }
}

/// See [`s1_single_scatter`]
#[derive(Debug, Clone)]
pub struct S1SingleScatter {
    id: CutId,
    model: S2WidthModel,
}
//
impl Cut for S1SingleScatter {
    fn id(&self) -> &CutId {
        &self.id
    }

    fn evaluate(&self, table: &mut EventTable) -> Result<()> {
        let s2 = table.floats("s2")?;
        let width = table.floats("s2_range_50p_area")?;
        let alt_z = table.floats("alt_s1_interaction_z")?;
        let pass = map_rows(table.num_rows(), |row| {
            let alt_rel_width = width[row] / self.model.width(alt_z[row]);
            let (low, high) = S2WidthModel::relative_width_bounds(s2[row]);
            let alt_interaction_valid = alt_rel_width < high && alt_rel_width > low;
            !alt_interaction_valid
        });
        table.insert(self.id.name(), pass)
    }
}

/// File from which [`s1_area_fraction_top`] reads its light map
pub fn s1_aft_map_path(cfg: &Configuration) -> PathBuf {
    cfg.data_dir.join(data::S1_AFT_MAP_FILE)
}

/// Rejects events whose fraction of S1 light seen by the top array is
/// unlikely given the event position
///
/// Computes the p-value `pvalue_s1_area_fraction_top` of an exact binomial
/// test, where the expected top fraction at the event's (r, z) comes from a
/// Kr83m light map. The map is read from the data directory the first time
/// the cut is run. Events with a missing S1, or with more photoelectrons than
/// the test handles ([`MAX_TRIALS`](crate::stats::MAX_TRIALS)), fail.
///
pub fn s1_area_fraction_top(cfg: &Configuration) -> S1AreaFractionTop {
    S1AreaFractionTop {
        // Upper bound must accept a p-value of exactly 1
        range: RangeCut::new("S1AreaFractionTop", 1)
            .variable(S1AreaFractionTop::PVALUE_COLUMN)
            .allowed_range(1e-4, 1. + 1e-7),
        map_path: s1_aft_map_path(cfg),
    }
}

/// See [`s1_area_fraction_top`]
#[derive(Debug, Clone)]
pub struct S1AreaFractionTop {
    range: RangeCut,
    map_path: PathBuf,
}
//
impl S1AreaFractionTop {
    /// Column holding the p-value
    pub const PVALUE_COLUMN: &'static str = "pvalue_s1_area_fraction_top";

    /// P-value of one event
    fn pvalue(map: &RzMap, x: Float, y: Float, z: Float, s1: Float, aft: Float) -> Float {
        let trials = s1.round();
        let successes = (aft * s1).round();
        let valid = |n: Float| n.is_finite() && n >= 0.;
        if !(valid(trials) && valid(successes)) {
            return reals::NAN;
        }
        binom_test(successes as u64, trials as u64, map.at(hypot2(x, y), z))
    }
}
//
impl Cut for S1AreaFractionTop {
    fn id(&self) -> &CutId {
        self.range.id()
    }

    fn prepare(&self, table: &mut EventTable) -> Result<()> {
        let map: Arc<RzMap> = data::cached_map(&self.map_path)?;
        let (x, y, z) = (table.floats("x")?, table.floats("y")?, table.floats("z")?);
        let s1 = table.floats("s1")?;
        let aft = table.floats("s1_area_fraction_top")?;
        let pvalues = map_rows(table.num_rows(), |row| {
            Self::pvalue(&map, x[row], y[row], z[row], s1[row], aft[row])
        });
        table.insert(Self::PVALUE_COLUMN, pvalues)
    }

    fn evaluate(&self, table: &mut EventTable) -> Result<()> {
        self.range.evaluate(table)
    }
}

// ### S2 QUALITY ###

/// Version of [`s2_area_fraction_top`] used by cut sets
pub const S2_AREA_FRACTION_TOP_VERSION: i32 = 2;

/// Rejects events with an unusual fraction of S2 light on the top array
///
/// Mostly targets gas events, which have a large top fraction. Two versions
/// exist: version 2 is a fixed window chosen by eye, version 3 follows the
/// 0.5% and 99.5% quantiles of the top fraction as a function of S2 size.
///
pub fn s2_area_fraction_top(version: i32) -> Result<ExpressionCut> {
    let expression = match version {
        2 => "(s2_area_fraction_top < 0.72) & (s2_area_fraction_top > 0.5)",
        3 => {
            "(s2_area_fraction_top < 0.6177399420527526 + 3.713166211522462e-08 * s2 \
                                     + 0.5460484265254656 / log(s2)) \
             & (s2_area_fraction_top > 0.6648160611018054 - 2.590402853814859e-07 * s2 \
                                       - 0.8531029789184852 / log(s2))"
        }
        _ => {
            return Err(CutError::UnsupportedVariant {
                cut: "CutS2AreaFractionTop".to_owned(),
                requested: Version::Integer(version),
                available: "2, 3",
            })
        }
    };
    ExpressionCut::new("S2AreaFractionTop", version, expression)
}

/// Largest other S2 is small enough to come from photoionization
///
/// The bound switches smoothly from a low energy to a high energy linear
/// regime around S2 = 23300 PE.
///
pub fn s2_single_scatter() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S2SingleScatter",
        2,
        "largest_other_s2 < (s2 * 0.00832 + 72.3) / (exp((s2 - 23300) * 5.91e-4) + 1) \
                           + (s2 * 0.03 - 109) / (exp((23300 - s2) * 5.91e-4) + 1)",
    )
}

/// Low energy limit of [`s2_single_scatter`], valid for S2 < 20000 PE
pub fn s2_single_scatter_simple() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S2SingleScatterSimple",
        0,
        "largest_other_s2 < s2 * 0.00832 + 72.3",
    )
}

/// S2 width consistent with electron diffusion over the drift length
///
/// The allowed spread is larger at low energy, where widths fluctuate more.
/// Acceptance goes down for ERs above cS2 = 1e5 PE due to track length.
///
pub fn s2_width(cfg: &Configuration) -> CompositeCut {
    let model = S2WidthModel::new(cfg);
    CompositeCut::new("S2Width", 1)
        .with_doc("S2 width consistent with electron diffusion")
        .push(S2WidthCut::new("S2WidthHigh", model, WidthBound::High))
        .push(S2WidthCut::new("S2WidthLow", model, WidthBound::Low))
}

/// Diffusion model of the S2 width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct S2WidthModel {
    w0: Float,
    diffusion_constant: Float,
    drift_velocity: Float,
}
//
impl S2WidthModel {
    /// Set up the model from the detector constants
    pub fn new(cfg: &Configuration) -> Self {
        Self {
            w0: cfg.s2_width_w0,
            diffusion_constant: cfg.diffusion_constant_liquid,
            drift_velocity: cfg.drift_velocity_liquid,
        }
    }

    /// Expected S2 width (ns) for an interaction at depth `z` (cm, negative)
    pub fn width(&self, z: Float) -> Float {
        let v = self.drift_velocity;
        (self.w0.powi(2) - 4.0325 * self.diffusion_constant * z / (v * v * v)).sqrt()
    }

    /// Accepted (low, high) ratios of measured to expected width
    pub fn relative_width_bounds(s2: Float) -> (Float, Float) {
        let x = 0.3 * clip(s2, 150., 7000.).log10();
        (-0.3 + x, 2.3 - x)
    }
}

/// Side of the S2 width band which a cut enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthBound {
    /// Width not too large
    High,

    /// Width not too small
    Low,
}

/// One side of the S2 width cut
#[derive(Debug, Clone)]
pub struct S2WidthCut {
    id: CutId,
    model: S2WidthModel,
    bound: WidthBound,
}
//
impl S2WidthCut {
    fn new(identifier: &str, model: S2WidthModel, bound: WidthBound) -> Self {
        Self {
            id: CutId::new(identifier, 1),
            model,
            bound,
        }
    }
}
//
impl Cut for S2WidthCut {
    fn id(&self) -> &CutId {
        &self.id
    }

    /// Stores the relative S2 width in the scratch column
    fn prepare(&self, table: &mut EventTable) -> Result<()> {
        let width = table.floats("s2_range_50p_area")?;
        let z = table.floats("z")?;
        let relative = map_rows(table.num_rows(), |row| width[row] / self.model.width(z[row]));
        table.insert(TEMP_COLUMN, relative)
    }

    fn evaluate(&self, table: &mut EventTable) -> Result<()> {
        let relative = table.floats(TEMP_COLUMN)?;
        let s2 = table.floats("s2")?;
        let pass = map_rows(table.num_rows(), |row| {
            let (low, high) = S2WidthModel::relative_width_bounds(s2[row]);
            match self.bound {
                WidthBound::High => relative[row] <= high,
                WidthBound::Low => low <= relative[row],
            }
        });
        table.insert(self.id.name(), pass)
    }
}

// ### MISCELLANEOUS ###

/// Rejects events with a lot of peak area before the main S2
///
/// Computes `signal_over_pre_s2_junk`. Only tuned for small S2s, and not part
/// of any cut set.
///
pub fn signal_over_pre_s2_junk() -> Result<RangeCut> {
    Ok(RangeCut::new("SignalOverPreS2Junk", 0)
        .derive(
            "signal_over_pre_s2_junk",
            "(area_before_main_s2 - s1) / (s2 + s1)",
        )?
        .variable("signal_over_pre_s2_junk")
        .allowed_range(0., 1.))
}
