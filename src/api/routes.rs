//! Route table.

use actix_web::web;

use super::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/state", web::get().to(handlers::state))
            .route("/trend", web::get().to(handlers::trend))
            .route("/metrics/model", web::get().to(handlers::model_metrics))
            .route("/control/start", web::post().to(handlers::start))
            .route("/control/stop", web::post().to(handlers::stop))
            .route("/control/mode", web::post().to(handlers::toggle_mode))
            .route("/params", web::post().to(handlers::set_params))
            .route("/patients/{id}", web::post().to(handlers::select_patient))
            .route("/datasets", web::post().to(handlers::upload)),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{test, web, App};
    use tokio::sync::Mutex;

    use crate::api::{configure, AppState};
    use crate::replay::ReplaySession;
    use crate::storage::UploadStore;

    fn app_state() -> web::Data<AppState> {
        let dir = std::env::temp_dir().join(format!("rosphere-api-{}", uuid::Uuid::new_v4()));
        web::Data::new(AppState {
            session: Arc::new(Mutex::new(ReplaySession::new())),
            uploads: UploadStore::new(dir.join("uploads"), Duration::from_secs(600)),
            patient_dir: dir.join("patients"),
        })
    }

    #[actix_web::test]
    async fn state_snapshot_has_initial_defaults() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/state").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mode"], "MANUAL");
        assert_eq!(body["running"], false);
        assert_eq!(body["simulation_time"], 0.0);
        assert_eq!(body["risk"], 46.5);
        assert_eq!(body["risk_band"], "Low");
    }

    #[actix_web::test]
    async fn params_are_applied_in_manual_mode_only() {
        let state = app_state();
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/params")
            .set_json(serde_json::json!({ "map": 90.0 }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["vitals"]["map"], 90.0);

        // Flip to automatic: the same write is now ignored.
        let req = test::TestRequest::post().uri("/api/control/mode").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mode"], "AUTOMATIC");

        let req = test::TestRequest::post()
            .uri("/api/params")
            .set_json(serde_json::json!({ "map": 40.0 }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["vitals"]["map"], 90.0);
    }

    #[actix_web::test]
    async fn upload_without_time_column_is_rejected_inline() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/datasets")
            .set_payload("MAP,CO\n75,5.0\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn manual_mode_upload_is_refused_and_not_parked() {
        let state = app_state();
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/datasets")
            .set_payload("time,MAP\n0,75\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);

        // Nothing loaded, and nothing waiting in the retention directory.
        assert!(!state.session.lock().await.has_dataset());
        assert!(!state.uploads.dir().exists());
    }

    #[actix_web::test]
    async fn upload_then_start_replays_the_dataset() {
        let state = app_state();
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/control/mode").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/datasets")
            .set_payload("time,MAP,CO,SVV,PVV\n0,80,5.0,12,11\n10,70,4.0,14,12\n")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["rows"], 2);
        assert_eq!(body["loaded"], true);

        let req = test::TestRequest::post().uri("/api/control/start").to_request();
        test::call_service(&app, req).await;

        state.session.lock().await.tick();

        let req = test::TestRequest::get().uri("/api/state").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["running"], true);
        assert_eq!(body["risk_history"].as_array().unwrap().len(), 1);
        assert_eq!(body["vitals"]["map"], 80.0);
    }

    #[actix_web::test]
    async fn selecting_a_patient_loads_a_dataset() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;

        let req = test::TestRequest::post().uri("/api/control/mode").to_request();
        test::call_service(&app, req).await;

        // No patient file exists, so this exercises the synthetic fallback.
        let req = test::TestRequest::post().uri("/api/patients/3").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["patient"], 3);
        assert_eq!(body["loaded"], true);
    }
}
