use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA cache_size = -32000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plate_detections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plate_text TEXT NOT NULL,
            easyocr_text TEXT NOT NULL,
            easyocr_confidence REAL NOT NULL,
            paddleocr_text TEXT NOT NULL,
            paddleocr_confidence REAL NOT NULL,
            ensemble_confidence REAL NOT NULL,
            ensemble_source TEXT NOT NULL,
            detection_confidence REAL,
            image_path TEXT,
            detected_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_plate_detections_plate_text ON plate_detections(plate_text)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// A detection ready to be persisted. The final plate text and source come
/// out of the ensemble; the per-engine fields record what each engine saw.
#[derive(Debug, Clone)]
pub struct NewDetection {
    pub plate_text: String,
    pub easyocr_text: String,
    pub easyocr_confidence: f64,
    pub paddleocr_text: String,
    pub paddleocr_confidence: f64,
    pub ensemble_confidence: f64,
    pub ensemble_source: String,
    pub detection_confidence: Option<f64>,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: i64,
    pub plate_text: String,
    pub easyocr_text: String,
    pub easyocr_confidence: f64,
    pub paddleocr_text: String,
    pub paddleocr_confidence: f64,
    pub ensemble_confidence: f64,
    pub ensemble_source: String,
    pub detection_confidence: Option<f64>,
    pub image_path: Option<String>,
    pub detected_at: String,
}

pub async fn insert_detection(pool: &DbPool, detection: &NewDetection) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO plate_detections (
            plate_text, easyocr_text, easyocr_confidence,
            paddleocr_text, paddleocr_confidence,
            ensemble_confidence, ensemble_source,
            detection_confidence, image_path
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&detection.plate_text)
    .bind(&detection.easyocr_text)
    .bind(detection.easyocr_confidence)
    .bind(&detection.paddleocr_text)
    .bind(detection.paddleocr_confidence)
    .bind(detection.ensemble_confidence)
    .bind(&detection.ensemble_source)
    .bind(detection.detection_confidence)
    .bind(&detection.image_path)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

type DetectionRow = (
    i64,
    String,
    String,
    f64,
    String,
    f64,
    f64,
    String,
    Option<f64>,
    Option<String>,
    String,
);

const DETECTION_COLUMNS: &str = "id, plate_text, easyocr_text, easyocr_confidence, \
    paddleocr_text, paddleocr_confidence, ensemble_confidence, ensemble_source, \
    detection_confidence, image_path, detected_at";

fn record_from_row(r: DetectionRow) -> DetectionRecord {
    DetectionRecord {
        id: r.0,
        plate_text: r.1,
        easyocr_text: r.2,
        easyocr_confidence: r.3,
        paddleocr_text: r.4,
        paddleocr_confidence: r.5,
        ensemble_confidence: r.6,
        ensemble_source: r.7,
        detection_confidence: r.8,
        image_path: r.9,
        detected_at: r.10,
    }
}

pub async fn get_detection_by_id(
    pool: &DbPool,
    id: i64,
) -> Result<Option<DetectionRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, DetectionRow>(&format!(
        "SELECT {DETECTION_COLUMNS} FROM plate_detections WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(record_from_row))
}

pub async fn list_recent_detections(
    pool: &DbPool,
    limit: i64,
) -> Result<Vec<DetectionRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DetectionRow>(&format!(
        "SELECT {DETECTION_COLUMNS} FROM plate_detections ORDER BY id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(record_from_row).collect())
}

pub async fn list_detections_by_plate(
    pool: &DbPool,
    plate_text: &str,
) -> Result<Vec<DetectionRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DetectionRow>(&format!(
        "SELECT {DETECTION_COLUMNS} FROM plate_detections WHERE plate_text = ? ORDER BY id DESC"
    ))
    .bind(plate_text)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(record_from_row).collect())
}
