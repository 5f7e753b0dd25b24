pub mod health;
pub mod schedule;

use std::error::Error as StdError;

use http::header::{self, HeaderValue};
use http::{Method, Request, StatusCode};
use hyper::body::Body;

use crate::response::{empty, failure, JsonResponse};
use crate::AppState;

pub const HEALTH: &str = "/";
pub const SCHEDULE: &str = "/api/schedule";

pub async fn route<B>(state: &AppState, request: Request<B>) -> JsonResponse
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let path = request.uri().path().to_owned();
    let method = request.method().clone();
    match (path.as_str(), method) {
        (_, Method::OPTIONS) => preflight(),
        (HEALTH, Method::GET | Method::HEAD) => health::health(),
        (SCHEDULE, Method::POST) => schedule::schedule(state, request).await,
        (HEALTH | SCHEDULE, _) => failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed."),
        _ => failure(StatusCode::NOT_FOUND, "Not found."),
    }
}

fn preflight() -> JsonResponse {
    let mut response = empty(StatusCode::NO_CONTENT);
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("600"));
    response
}
