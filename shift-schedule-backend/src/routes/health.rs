use http::StatusCode;
use serde_json::json;

use crate::response::{json, JsonResponse};

pub fn health() -> JsonResponse {
    json(
        StatusCode::OK,
        &json!({"status": "ok", "service": "shift-schedule-backend"}),
    )
}
