use std::collections::HashSet;
use std::error::Error as StdError;

use http::{Request, StatusCode};
use http_body_util::{BodyExt as _, LengthLimitError, Limited};
use hyper::body::Body;
use serde::Serialize;
use serde_json::Value;
use shift_schedule_optimizer::{
    solve, validate_shift_definitions, Schedule, ScheduleRequest, StaffId,
};
use tracing::{debug, error, warn, Span};

use crate::error::{AppError, RequestError};
use crate::response::{failure, failure_with_warnings, json, JsonResponse};
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Solved<'a> {
    success: bool,
    schedule: &'a Schedule,
    warnings: &'a [String],
    calculation_time_ms: u64,
}

/// Parses a schedule request and applies the checks that are cheaper to
/// answer here than after a solve.
pub fn parse_schedule_request(body: &[u8]) -> Result<ScheduleRequest, RequestError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| RequestError::NotJson)?;
    if !value.as_object().is_some_and(|object| !object.is_empty()) {
        return Err(RequestError::NotJson);
    }

    let request: ScheduleRequest = serde_path_to_error::deserialize(value)
        .map_err(|error| RequestError::Fields(format!("{}: {}", error.path(), error.inner())))?;

    validate_shift_definitions(&request.shift_definitions)?;

    if request
        .staff_list
        .iter()
        .any(|staff| staff.id.as_str().trim().is_empty())
    {
        return Err(RequestError::StaffStructure);
    }

    let known: HashSet<&StaffId> = request.staff_list.iter().map(|staff| &staff.id).collect();
    let unknown: Vec<&str> = request
        .staff_priority
        .iter()
        .filter(|id| !known.contains(id))
        .map(StaffId::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(RequestError::UnknownPriorityIds(unknown.join(", ")));
    }

    Ok(request)
}

pub async fn schedule<B>(state: &AppState, request: Request<B>) -> JsonResponse
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let limit = state.config.server.max_body_bytes;
    let body = match Limited::new(request.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(error) if error.downcast_ref::<LengthLimitError>().is_some() => {
            return failure(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.");
        }
        Err(error) => {
            warn!(%error, "failed to read request body");
            return failure(StatusCode::BAD_REQUEST, "Error parsing request data.");
        }
    };

    let request = match parse_schedule_request(&body) {
        Ok(request) => request,
        Err(rejection) => {
            debug!(%rejection, "rejected schedule request");
            return failure(StatusCode::BAD_REQUEST, &rejection.to_string());
        }
    };

    let settings = state.config.solver.clone();
    let span = Span::current();
    let outcome = tokio::task::spawn_blocking(move || span.in_scope(|| solve(&request, &settings))).await;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(join_error) => {
            let error = AppError::from(join_error);
            error!(%error, "schedule calculation failed");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred during schedule calculation.",
            );
        }
    };

    match &outcome.schedule {
        Some(schedule) => json(
            StatusCode::OK,
            &Solved {
                success: true,
                schedule,
                warnings: &outcome.warnings,
                calculation_time_ms: outcome.elapsed_ms,
            },
        ),
        None => failure_with_warnings(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Could not find a valid schedule.",
            &outcome.warnings,
        ),
    }
}
