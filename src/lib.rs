//! ROSphere Monitor core library
//!
//! Replay engine, risk scoring, and trend statistics behind the ROSphere
//! hemodynamic-monitoring dashboard, plus the HTTP control surface the
//! dashboard talks to.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod replay;
pub mod risk;
pub mod runtime;
pub mod series;
pub mod stats;
pub mod storage;

pub use error::{MonitorError, Result};
pub use replay::{Mode, ReplaySession};
pub use risk::{desaturation_probability, replay_risk, RiskBand, Vitals};
pub use series::{Sample, SeriesStore};
pub use stats::{summarize, TrendDirection, TrendSummary};
