//! The replay session: simulation clock, operating mode, and the update
//! procedure that feeds the sample history.
//!
//! A session is an explicit object with defined construction and reset
//! semantics; it is created once per process and injected wherever state is
//! needed rather than living in ambient globals. The cadence at which
//! [`ReplaySession::tick`] is invoked belongs to the scheduler in
//! [`crate::runtime`], keeping the core independent of any refresh loop.

use std::path::Path;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dataset::{load_patient_dataset, SourceDataset, SourceRow};
use crate::error::Result;
use crate::risk::{replay_risk, Vitals, DEFAULT_CO, DEFAULT_MAP, DEFAULT_PVV, DEFAULT_SVV};
use crate::series::{Sample, SeriesStore};

/// Simulated seconds added per tick.
pub const TICK_SECONDS: f64 = 0.1;

/// Operating mode of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Operator-driven live parameter entry.
    Manual,
    /// Dataset-driven replay.
    Automatic,
}

/// Process-wide replay state.
///
/// Owns the sample history and the current vitals exclusively; the source
/// dataset is swapped wholesale on each load.
#[derive(Debug)]
pub struct ReplaySession {
    mode: Mode,
    running: bool,
    simulation_time: f64,
    vitals: Vitals,
    series: SeriesStore,
    dataset: Option<SourceDataset>,
    patient: Option<u32>,
}

impl Default for ReplaySession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplaySession {
    pub fn new() -> Self {
        ReplaySession {
            mode: Mode::Manual,
            running: false,
            simulation_time: 0.0,
            vitals: Vitals::default(),
            series: SeriesStore::new(),
            dataset: None,
            patient: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn vitals(&self) -> Vitals {
        self.vitals
    }

    pub fn series(&self) -> &SeriesStore {
        &self.series
    }

    pub fn patient(&self) -> Option<u32> {
        self.patient
    }

    pub fn has_dataset(&self) -> bool {
        self.dataset.is_some()
    }

    /// Risk of the current vitals, recomputed on demand.
    pub fn current_risk(&self) -> f64 {
        replay_risk(self.vitals)
    }

    pub fn risk_history(&self) -> Vec<f64> {
        self.series.risk_history()
    }

    /// Chart x-axis: replayed times in automatic mode, sample indices in
    /// manual mode.
    pub fn x_axis(&self) -> Vec<f64> {
        match self.mode {
            Mode::Automatic => self.series.times(),
            Mode::Manual => (0..self.series.len()).map(|i| i as f64).collect(),
        }
    }

    /// Switch MANUAL <-> AUTOMATIC. Entering MANUAL stops the clock; the
    /// simulation cannot auto-advance while the controls are editable.
    /// Switching back does not auto-resume.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Manual => Mode::Automatic,
            Mode::Automatic => {
                self.running = false;
                Mode::Manual
            }
        };
        info!(mode = ?self.mode, "operation mode changed");
    }

    /// Begin auto-advancing. Only meaningful in AUTOMATIC.
    pub fn start(&mut self) {
        if self.mode != Mode::Automatic {
            debug!("start ignored outside automatic mode");
            return;
        }
        self.running = true;
        info!("simulation running");
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("simulation stopped");
        }
        self.running = false;
    }

    /// Clear the clock, stop the replay, and discard the history. Invoked
    /// whenever the active dataset changes.
    pub fn reset(&mut self) {
        self.simulation_time = 0.0;
        self.running = false;
        self.series.clear();
    }

    /// Install a new source dataset, resetting the session. A dataset is
    /// meaningless in MANUAL mode, where the call is ignored.
    pub fn load_dataset(&mut self, dataset: SourceDataset) {
        if self.mode != Mode::Automatic {
            warn!("dataset load ignored in manual mode");
            return;
        }
        self.reset();
        info!(rows = dataset.len(), "dataset loaded");
        self.dataset = Some(dataset);
    }

    /// Select a patient, loading `<id>.csv` (or the synthetic fallback) when
    /// the selection actually changes. Like [`load_dataset`](Self::load_dataset)
    /// this is an automatic-mode concern; the id is only recorded once its
    /// dataset is actually installed, so an ignored selection can be retried.
    pub fn select_patient<R: Rng + ?Sized>(
        &mut self,
        patient_id: u32,
        data_dir: &Path,
        rng: &mut R,
    ) {
        if self.mode != Mode::Automatic {
            warn!(patient = patient_id, "patient selection ignored in manual mode");
            return;
        }
        if self.patient == Some(patient_id) {
            return;
        }
        let dataset = load_patient_dataset(data_dir, patient_id, rng);
        self.load_dataset(dataset);
        self.patient = Some(patient_id);
    }

    /// Parameter edits, honored only in MANUAL mode. Each accepted edit
    /// records a sample, so the trend reflects the operator's input history.
    pub fn set_map(&mut self, value: f64) -> f64 {
        self.edit(|v| v.map = value)
    }

    pub fn set_co(&mut self, value: f64) -> f64 {
        self.edit(|v| v.co = value)
    }

    pub fn set_svv(&mut self, value: f64) -> f64 {
        self.edit(|v| v.svv = value)
    }

    pub fn set_pvv(&mut self, value: f64) -> f64 {
        self.edit(|v| v.pvv = value)
    }

    fn edit(&mut self, apply: impl FnOnce(&mut Vitals)) -> f64 {
        if self.mode != Mode::Manual {
            debug!("parameter edit ignored outside manual mode");
            return self.current_risk();
        }
        apply(&mut self.vitals);
        self.update()
    }

    /// Advance the simulated clock by one interval and run the update
    /// procedure. The scheduler only drives this while AUTOMATIC and
    /// running; invoking it directly on a manual session appends one sample
    /// per call.
    pub fn tick(&mut self) -> f64 {
        self.simulation_time += TICK_SECONDS;
        self.update()
    }

    /// The update procedure: refresh current values and the sample history,
    /// then return the freshly computed risk.
    ///
    /// Automatic replays fail soft: a dataset problem leaves the current
    /// values and history at their last-good state and the loop carries on
    /// next tick.
    pub fn update(&mut self) -> f64 {
        if self.mode == Mode::Automatic && self.running && self.dataset.is_some() {
            if let Err(err) = self.replay_from_dataset() {
                warn!(error = %err, "automatic update failed; keeping last-good state");
            }
        } else {
            let risk = replay_risk(self.vitals);
            self.series
                .push_bounded(Sample::new(self.simulation_time, self.vitals, risk));
        }

        let risk = replay_risk(self.vitals);
        // The automatic branch scores every row it stores, but a malformed
        // row can smuggle a non-finite score through; repair rather than
        // leave the history short.
        if self.series.len() > self.series.scored_len() {
            self.series.repair_tail_risk(risk);
        }
        risk
    }

    fn replay_from_dataset(&mut self) -> Result<()> {
        let Some(dataset) = self.dataset.as_ref() else {
            return Ok(());
        };
        if let Some(max_time) = dataset.max_time() {
            if self.simulation_time > max_time {
                self.simulation_time = max_time;
            }
        }
        let rows = dataset.rows_up_to(self.simulation_time);
        let Some(current) = rows.last() else {
            return Ok(());
        };

        self.vitals = row_vitals(current);
        let samples: Vec<Sample> = rows
            .iter()
            .map(|row| {
                let vitals = row_vitals(row);
                Sample::new(row.time, vitals, replay_risk(vitals))
            })
            .collect();
        self.series.replace(samples);
        Ok(())
    }
}

/// Row vitals with the standard per-field fallbacks for absent columns.
fn row_vitals(row: &SourceRow) -> Vitals {
    Vitals {
        map: row.map.unwrap_or(DEFAULT_MAP),
        co: row.co.unwrap_or(DEFAULT_CO),
        svv: row.svv.unwrap_or(DEFAULT_SVV),
        pvv: row.pvv.unwrap_or(DEFAULT_PVV),
    }
}
