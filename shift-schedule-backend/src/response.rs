//! JSON bodies and the headers every response carries.

use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use shift_schedule_config::CorsConfig;
use tracing::error;

use crate::error::AppError;

pub type JsonResponse = Response<Full<Bytes>>;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Serialize)]
struct Failure<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<&'a [String]>,
}

pub fn json<T: Serialize>(status: StatusCode, body: &T) -> JsonResponse {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Full::new(Bytes::from(bytes)));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(error) => {
            let error = AppError::from(error);
            error!(%error, "failed to serialize response");
            empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub fn empty(status: StatusCode) -> JsonResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

pub fn failure(status: StatusCode, message: &str) -> JsonResponse {
    json(
        status,
        &Failure {
            success: false,
            message,
            warnings: None,
        },
    )
}

pub fn failure_with_warnings(status: StatusCode, message: &str, warnings: &[String]) -> JsonResponse {
    json(
        status,
        &Failure {
            success: false,
            message,
            warnings: Some(warnings),
        },
    )
}

/// Security headers, the request id and, for allowed origins, CORS.
pub fn decorate(response: &mut JsonResponse, request_id: u64, origin: Option<&str>, cors: &CorsConfig) {
    let headers = response.headers_mut();
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(X_REQUEST_ID, HeaderValue::from(request_id));

    let allowed = origin
        .filter(|origin| cors.allows(origin))
        .and_then(|origin| HeaderValue::from_str(origin).ok());
    if let Some(origin) = allowed {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }
}
