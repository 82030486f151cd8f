//! lax: standardized event selections for TPC analyses
//!
//!
//! # Introduction (for the physicist)
//!
//! Reconstructed events come as a table with one row per event and one column
//! per reconstructed quantity (S1 and S2 areas, positions, timing...). An
//! analysis keeps the events that pass a list of selection criteria, or cuts,
//! and those criteria evolve from one science run to the next as the detector
//! gets better understood.
//!
//! This crate provides these criteria in a single place, with a name and a
//! version for each of them, so that two analyses claiming to use
//! `CutS2Threshold` version 0 really select the same events.
//!
//!
//! # Introduction (for the computer guy)
//!
//! There are only a few kinds of cuts, all implementing the [`Cut`] trait:
//!
//! * [`RangeCut`]s check that one column lies within an open interval
//! * [`ExpressionCut`]s evaluate a small boolean [expression](expr) over the
//!   table's columns
//! * [`CompositeCut`]s AND the output of a list of member cuts together
//! * a handful of bespoke cuts, in the [`catalog`], need lookup tables or
//!   per-run bookkeeping that does not fit an expression
//!
//! Cuts never remove events. Running a cut adds a boolean column named after
//! it, and analysis code decides what to do with that column.
//!
//! The [`catalog`] organizes cuts per run period, and assembles them into cut
//! sets which can be looked up by name.

#![warn(missing_docs)]

pub mod catalog;
pub mod composite;
pub mod config;
pub mod cut;
pub mod data;
pub mod error;
pub mod expr;
pub mod expression;
pub mod numeric;
pub mod range;
mod scheduling;
pub mod stats;
pub mod table;
pub mod variables;

pub use crate::{
    composite::CompositeCut,
    config::Configuration,
    cut::{Cut, CutId, Version},
    error::{CutError, Result},
    expression::ExpressionCut,
    range::RangeCut,
    table::{Column, EventTable},
};

/// Version of this library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
