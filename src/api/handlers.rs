//! Request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::warn;

use crate::dataset::SourceDataset;
use crate::replay::{Mode, ReplaySession};
use crate::risk::{RiskBand, Vitals};
use crate::stats::{self, SAMPLE_INTERVAL_SECONDS};
use crate::storage::UploadStore;

/// Shared application state, injected into every handler.
pub struct AppState {
    pub session: Arc<Mutex<ReplaySession>>,
    pub uploads: UploadStore,
    pub patient_dir: PathBuf,
}

/// Everything the dashboard needs to redraw, in one payload.
#[derive(Debug, Serialize)]
pub struct StateSnapshot {
    pub mode: Mode,
    pub running: bool,
    pub simulation_time: f64,
    pub vitals: Vitals,
    pub risk: f64,
    pub risk_band: RiskBand,
    pub patient: Option<u32>,
    pub x_axis: Vec<f64>,
    pub risk_history: Vec<f64>,
}

pub async fn state(state: web::Data<AppState>) -> impl Responder {
    let session = state.session.lock().await;
    let risk = session.current_risk();
    HttpResponse::Ok().json(StateSnapshot {
        mode: session.mode(),
        running: session.running(),
        simulation_time: session.simulation_time(),
        vitals: session.vitals(),
        risk,
        risk_band: RiskBand::from_score(risk),
        patient: session.patient(),
        x_axis: session.x_axis(),
        risk_history: session.risk_history(),
    })
}

pub async fn trend(state: web::Data<AppState>) -> impl Responder {
    let session = state.session.lock().await;
    let summary = stats::summarize(&session.risk_history(), SAMPLE_INTERVAL_SECONDS);
    HttpResponse::Ok().json(summary)
}

/// Static performance figures of the offline-trained model, displayed on the
/// dashboard's metrics card.
pub async fn model_metrics() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "AUC": 0.93,
        "F1-Score": 0.89,
        "Precision": 0.88,
        "Sensitivity": 0.88,
        "Specificity": 0.90,
        "Accuracy": 0.89,
    }))
}

pub async fn start(state: web::Data<AppState>) -> impl Responder {
    let mut session = state.session.lock().await;
    session.start();
    HttpResponse::Ok().json(json!({ "running": session.running() }))
}

pub async fn stop(state: web::Data<AppState>) -> impl Responder {
    let mut session = state.session.lock().await;
    session.stop();
    HttpResponse::Ok().json(json!({ "running": session.running() }))
}

pub async fn toggle_mode(state: web::Data<AppState>) -> impl Responder {
    let mut session = state.session.lock().await;
    session.toggle_mode();
    HttpResponse::Ok().json(json!({ "mode": session.mode(), "running": session.running() }))
}

/// Partial parameter update; each present field is one edit. Edits are
/// ignored outside manual mode, which the response makes visible by echoing
/// the (unchanged) vitals.
#[derive(Debug, Deserialize)]
pub struct ParamUpdate {
    pub map: Option<f64>,
    pub co: Option<f64>,
    pub svv: Option<f64>,
    pub pvv: Option<f64>,
}

pub async fn set_params(
    state: web::Data<AppState>,
    update: web::Json<ParamUpdate>,
) -> impl Responder {
    let mut session = state.session.lock().await;
    if let Some(map) = update.map {
        session.set_map(map);
    }
    if let Some(co) = update.co {
        session.set_co(co);
    }
    if let Some(svv) = update.svv {
        session.set_svv(svv);
    }
    if let Some(pvv) = update.pvv {
        session.set_pvv(pvv);
    }
    HttpResponse::Ok().json(json!({
        "vitals": session.vitals(),
        "risk": session.current_risk(),
    }))
}

pub async fn select_patient(
    state: web::Data<AppState>,
    path: web::Path<u32>,
) -> impl Responder {
    let patient_id = path.into_inner();
    let mut session = state.session.lock().await;
    session.select_patient(patient_id, &state.patient_dir, &mut rand::thread_rng());
    HttpResponse::Ok().json(json!({
        "patient": session.patient(),
        "loaded": session.has_dataset(),
    }))
}

/// Ingest an uploaded CSV dataset.
///
/// The table is validated before anything else; a malformed upload comes
/// back as an inline 422 message and leaves the session untouched. Uploads
/// are only meaningful in automatic mode; a manual-mode upload is refused
/// before anything lands in the retention directory. Accepted uploads are
/// parked on disk with the retention timer armed, then loaded into the
/// session.
pub async fn upload(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let dataset = match SourceDataset::from_csv_reader(body.as_ref()) {
        Ok(dataset) => dataset,
        Err(err) => {
            return HttpResponse::UnprocessableEntity().json(json!({ "error": err.to_string() }));
        }
    };

    let mut session = state.session.lock().await;
    if session.mode() != Mode::Automatic {
        return HttpResponse::Conflict()
            .json(json!({ "error": "datasets are only accepted in automatic mode" }));
    }

    // Retention is bookkeeping; a storage hiccup must not block the replay.
    if let Err(err) = state.uploads.save(&body).await {
        warn!(error = %err, "failed to park upload for retention");
    }

    let rows = dataset.len();
    session.load_dataset(dataset);
    HttpResponse::Ok().json(json!({
        "rows": rows,
        "loaded": true,
    }))
}
