//! catex - catenary measurement exception detection
//!
//! Turns per-location overhead line measurements (contact wire stagger,
//! remaining thickness, height) into graded exception tables, matches
//! exceptions across consecutive surveys, and reviews wire wear L2 repeats
//! with a linear trend over their history.
//!
//! The pipeline for one survey is
//! [`prepare`](prepare::prepare) → [`Detector`](detector::Detector) →
//! [`annotate`](annotate::annotate), wrapped by
//! [`ExceptionReport::generate`](report::ExceptionReport::generate).

pub mod annotate;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod detector;
pub mod error;
pub mod grouping;
pub mod input;
pub mod json_output;
pub mod matcher;
pub mod metadata;
pub mod prepare;
pub mod report;
pub mod survey;
pub mod text_output;
pub mod threshold;
pub mod trend;
pub mod wear_summary;

pub use error::{CatexError, Result};
