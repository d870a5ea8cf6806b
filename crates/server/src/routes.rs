//! HTTP surface: one recognition endpoint plus read-back queries over the
//! detection log.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use lpr_core::{EngineId, RawReading};
use lpr_storage::{DbPool, DetectionRecord, NewDetection};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/v1/recognize", post(recognize))
        .route("/v1/detections", get(list_detections))
        .route("/v1/detections/{id}", get(get_detection))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("detection not found")]
    NotFound,
    #[error("storage error")]
    Storage(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(err) => {
                tracing::error!(%err, "storage error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct OcrReadingInput {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Deserialize)]
pub struct PlateRegionInput {
    pub easyocr: OcrReadingInput,
    pub paddleocr: OcrReadingInput,
    pub bbox: Option<[i32; 4]>,
    pub detection_confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct RecognizeRequest {
    pub image_path: Option<String>,
    pub regions: Vec<PlateRegionInput>,
}

#[derive(Debug, Serialize)]
pub struct PlateOutput {
    pub id: i64,
    pub text: String,
    pub confidence: f32,
    pub bbox: Option<[i32; 4]>,
    pub detection_confidence: Option<f32>,
    pub ocr_easyocr: String,
    pub ocr_easyocr_confidence: f32,
    pub ocr_paddleocr: String,
    pub ocr_paddleocr_confidence: f32,
    pub ensemble_source: String,
    pub detected_at: String,
}

#[derive(Debug, Serialize)]
pub struct RecognizeResponse {
    pub plates: Vec<PlateOutput>,
    pub processing_time: f64,
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "lpr-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run the ensemble over each submitted region, persist every decision, and
/// return the plates ordered by detection confidence.
async fn recognize(
    State(state): State<AppState>,
    Json(request): Json<RecognizeRequest>,
) -> Result<Json<RecognizeResponse>, ApiError> {
    let started = Instant::now();

    let mut plates = Vec::with_capacity(request.regions.len());
    for region in &request.regions {
        let easy = RawReading::new(
            EngineId::EasyOcr,
            &region.easyocr.text,
            region.easyocr.confidence,
        );
        let paddle = RawReading::new(
            EngineId::PaddleOcr,
            &region.paddleocr.text,
            region.paddleocr.confidence,
        );
        let outcome = lpr_core::fuse(&easy, &paddle);

        let id = lpr_storage::insert_detection(
            &state.db,
            &NewDetection {
                plate_text: outcome.decision.final_text.clone(),
                easyocr_text: outcome.easyocr.cleaned_text.clone(),
                easyocr_confidence: f64::from(outcome.easyocr.confidence),
                paddleocr_text: outcome.paddleocr.cleaned_text.clone(),
                paddleocr_confidence: f64::from(outcome.paddleocr.confidence),
                ensemble_confidence: f64::from(outcome.decision.final_confidence),
                ensemble_source: outcome.decision.source.to_string(),
                detection_confidence: region.detection_confidence.map(f64::from),
                image_path: request.image_path.clone(),
            },
        )
        .await?;
        let record = lpr_storage::get_detection_by_id(&state.db, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        plates.push(PlateOutput {
            id,
            text: outcome.decision.final_text,
            confidence: outcome.decision.final_confidence,
            bbox: region.bbox,
            detection_confidence: region.detection_confidence,
            ocr_easyocr: outcome.easyocr.cleaned_text,
            ocr_easyocr_confidence: outcome.easyocr.confidence,
            ocr_paddleocr: outcome.paddleocr.cleaned_text,
            ocr_paddleocr_confidence: outcome.paddleocr.confidence,
            ensemble_source: outcome.decision.source.to_string(),
            detected_at: record.detected_at,
        });
    }

    plates.sort_by(|a, b| {
        b.detection_confidence
            .partial_cmp(&a.detection_confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Json(RecognizeResponse {
        plates,
        processing_time: started.elapsed().as_secs_f64(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    /// Exact plate text to filter on.
    pub plate: Option<String>,
}

async fn list_detections(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<DetectionRecord>>, ApiError> {
    let records = match params.plate {
        Some(plate) => lpr_storage::list_detections_by_plate(&state.db, &plate).await?,
        None => {
            let limit = params.limit.unwrap_or(50).clamp(1, 500);
            lpr_storage::list_recent_detections(&state.db, limit).await?
        }
    };
    Ok(Json(records))
}

async fn get_detection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetectionRecord>, ApiError> {
    let record = lpr_storage::get_detection_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn test_app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let db = lpr_storage::create_db(&dir.path().join("test.db"))
            .await
            .unwrap();
        (dir, router(AppState { db }))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn recognize_corrects_and_persists() {
        let (_dir, app) = test_app().await;

        let request = post_json(
            "/v1/recognize",
            serde_json::json!({
                "image_path": "frames/0001.jpg",
                "regions": [{
                    "easyocr": { "text": " o6 abc-123 ", "confidence": 0.55 },
                    "paddleocr": { "text": "06ABC123", "confidence": 0.50 },
                    "bbox": [10, 20, 110, 60],
                    "detection_confidence": 0.9
                }]
            }),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let plate = &body["plates"][0];
        assert_eq!(plate["text"], "06ABC123");
        assert_eq!(plate["ensemble_source"], "both_agree");
        assert!((plate["confidence"].as_f64().unwrap() - 0.715).abs() < 1e-6);
        assert_eq!(plate["bbox"], serde_json::json!([10, 20, 110, 60]));
        let id = plate["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/detections/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let record = body_json(response).await;
        assert_eq!(record["plate_text"], "06ABC123");
        assert_eq!(record["image_path"], "frames/0001.jpg");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/detections?limit=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let records = body_json(response).await;
        assert_eq!(records.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recognize_orders_plates_by_detection_confidence() {
        let (_dir, app) = test_app().await;

        let request = post_json(
            "/v1/recognize",
            serde_json::json!({
                "regions": [
                    {
                        "easyocr": { "text": "34AB123", "confidence": 0.6 },
                        "paddleocr": { "text": "34AB123", "confidence": 0.6 },
                        "detection_confidence": 0.4
                    },
                    {
                        "easyocr": { "text": "06CD45", "confidence": 0.6 },
                        "paddleocr": { "text": "06CD45", "confidence": 0.6 },
                        "detection_confidence": 0.9
                    }
                ]
            }),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let plates = body["plates"].as_array().unwrap();
        assert_eq!(plates[0]["text"], "06CD45");
        assert_eq!(plates[1]["text"], "34AB123");
    }

    #[tokio::test]
    async fn list_filters_by_plate_text() {
        let (_dir, app) = test_app().await;

        for (text, conf) in [("34AB123", 0.6), ("06CD45", 0.6), ("34AB123", 0.7)] {
            let request = post_json(
                "/v1/recognize",
                serde_json::json!({
                    "regions": [{
                        "easyocr": { "text": text, "confidence": conf },
                        "paddleocr": { "text": text, "confidence": conf }
                    }]
                }),
            );
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/detections?plate=34AB123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let records = body_json(response).await;
        let records = records.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r["plate_text"] == "34AB123"));
    }

    #[tokio::test]
    async fn recognize_accepts_empty_regions() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(post_json("/v1/recognize", serde_json::json!({ "regions": [] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["plates"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_detection_is_404() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/detections/9999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "detection not found");
    }
}
