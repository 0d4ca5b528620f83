//! bindcov — aggregates per-declaration usage observations into a
//! JaCoCo-style XML coverage report.
//!
//! An external declaration-discovery pass drives [`model::CoverageModel`]
//! through its two events (declare, mark used). Once the walk is finished,
//! [`report::build_report`] rolls the observations up into a report tree and
//! [`xml::write_to_file`] serializes it exactly once.

pub mod config;
pub mod counter;
pub mod error;
pub mod model;
pub mod report;
pub mod xml;
