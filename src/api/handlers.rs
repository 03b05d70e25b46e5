//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, StateResponse, TelemetryQuery, TelemetryResponse};

/// Returns the fleet's telemetry at the most recently completed tick.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let tick = state.devices.last().map(|d| d.tick).unwrap_or(0);
    Json(StateResponse {
        tick,
        devices: state.devices.iter().filter(|d| d.tick == tick).cloned().collect(),
        services: state.services.iter().filter(|s| s.tick == tick).cloned().collect(),
    })
}

/// Returns telemetry records, optionally filtered by tick range.
///
/// `GET /telemetry` → 200 + `TelemetryResponse` JSON
/// `GET /telemetry?from=N&to=M` → filtered range (inclusive)
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(State(state): State<Arc<AppState>>, Query(query): Query<TelemetryQuery>) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let devices = state.devices.iter().filter(|d| d.tick >= from && d.tick <= to).cloned().collect();
    let services = state.services.iter().filter(|s| s.tick >= from && s.tick <= to).cloned().collect();

    Ok(Json(TelemetryResponse { devices, services }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::io::{DeviceRecord, ServiceRecord};

    fn device_record(tick: usize, device_id: u32) -> DeviceRecord {
        DeviceRecord {
            tick,
            device_id,
            model_name: device_id.to_string(),
            model_type: "edge_device".into(),
            service_ids: vec![],
            power_source: "solar".into(),
            actual_power: 12.0,
            active: true,
            state: "on".into(),
            temperature_measurements: vec![20.0],
            transfer: None,
        }
    }

    fn service_record(tick: usize) -> ServiceRecord {
        ServiceRecord {
            tick,
            model_id: 10,
            model_name: "anomaly".into(),
            device_id: 1,
            state: "running".into(),
            program_counter: tick as u64,
            trained: false,
            max_training_time: 5,
            actual_training_time: tick as u32,
            max_prediction_time: 5,
            actual_prediction_time: 0,
            predictions_counter: 0,
        }
    }

    fn make_test_state() -> Arc<AppState> {
        let mut devices = Vec::new();
        let mut services = Vec::new();
        for t in 0..5 {
            devices.push(device_record(t, 1));
            services.push(service_record(t));
        }
        Arc::new(AppState { devices, services })
    }

    #[tokio::test]
    async fn state_returns_latest_tick_only() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder().uri("/state").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["tick"], 4);
        assert_eq!(json["devices"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn telemetry_returns_all_ticks_by_default() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder().uri("/telemetry").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["devices"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn telemetry_range_query() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder().uri("/telemetry?from=1&to=3").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["devices"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn telemetry_invalid_range_returns_400() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder().uri("/telemetry?from=3&to=1").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("error").is_some());
    }
}
