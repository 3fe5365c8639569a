//! Desaturation risk scoring.
//!
//! Two independent heuristics coexist and are deliberately not reconciled:
//!
//! * [`replay_risk`] is the formula driving the replay loop: a linear
//!   perfusion score clamped to [0, 100] and inverted. Note that higher
//!   SVV/PVV lowers the result; that direction is inherited from the
//!   clinical prototype and must not be "corrected" here.
//! * [`desaturation_probability`] is the standalone diagnostic heuristic:
//!   weighted categorical contributions per parameter with a small
//!   zero-mean jitter.
//!
//! Which one is authoritative is an open product question; callers choose.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAP: f64 = 75.0;
pub const DEFAULT_CO: f64 = 5.0;
pub const DEFAULT_SVV: f64 = 12.0;
pub const DEFAULT_PVV: f64 = 11.0;

/// One snapshot of the four monitored hemodynamic parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Mean arterial pressure (mmHg).
    pub map: f64,
    /// Cardiac output (L/min).
    pub co: f64,
    /// Stroke volume variation (%).
    pub svv: f64,
    /// Pulse volume variation (%).
    pub pvv: f64,
}

impl Default for Vitals {
    fn default() -> Self {
        Vitals {
            map: DEFAULT_MAP,
            co: DEFAULT_CO,
            svv: DEFAULT_SVV,
            pvv: DEFAULT_PVV,
        }
    }
}

impl Vitals {
    pub fn new(map: f64, co: f64, svv: f64, pvv: f64) -> Self {
        Vitals { map, co, svv, pvv }
    }
}

/// Risk score used by the replay path, in [0, 100].
///
/// `100 - clamp(0, 100, (map - 60) + 10*co - 0.5*svv - 0.5*pvv)`.
/// Deterministic and stateless.
pub fn replay_risk(vitals: Vitals) -> f64 {
    let perfusion =
        (vitals.map - 60.0) + vitals.co * 10.0 - vitals.svv * 0.5 - vitals.pvv * 0.5;
    100.0 - perfusion.clamp(0.0, 100.0)
}

/// Probability (%) of StO2 falling below 65% within 10 minutes.
///
/// Weighted sum of per-parameter categorical contributions (MAP/CO 0.35
/// each, SVV/PVV 0.15 each) against clinical breakpoints, plus zero-mean
/// jitter from the caller's RNG, clamped to [0, 100].
pub fn desaturation_probability<R: Rng + ?Sized>(vitals: Vitals, rng: &mut R) -> f64 {
    let map_risk = if vitals.map < 65.0 {
        0.4
    } else if vitals.map < 70.0 {
        0.2
    } else if vitals.map > 100.0 {
        0.3
    } else {
        0.0
    };

    let co_risk = if vitals.co < 2.5 {
        0.4
    } else if vitals.co < 4.0 {
        0.2
    } else if vitals.co > 8.0 {
        0.3
    } else {
        0.0
    };

    let svv_risk = if vitals.svv > 17.0 {
        0.3
    } else if vitals.svv > 13.0 {
        0.15
    } else {
        0.0
    };

    let pvv_risk = if vitals.pvv > 15.0 {
        0.3
    } else if vitals.pvv > 12.0 {
        0.15
    } else {
        0.0
    };

    let mut risk: f64 =
        map_risk * 0.35 + co_risk * 0.35 + svv_risk * 0.15 + pvv_risk * 0.15;
    risk += rng.gen_range(-0.05..=0.05);
    risk.clamp(0.0, 1.0) * 100.0
}

/// Display band for a risk score, matching the dashboard gauge cut points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskBand {
    Low,
    Elevated,
    High,
    Critical,
}

impl RiskBand {
    pub fn from_score(risk: f64) -> Self {
        if risk >= 90.0 {
            RiskBand::Critical
        } else if risk >= 80.0 {
            RiskBand::High
        } else if risk >= 60.0 {
            RiskBand::Elevated
        } else {
            RiskBand::Low
        }
    }
}
