pub mod db;

pub use db::{
    create_db, get_detection_by_id, insert_detection, list_detections_by_plate,
    list_recent_detections, DbPool, DetectionRecord, NewDetection,
};
