use tracing::error;

use crate::registry::Tracker;
use crate::server::api;
use crate::views::ViewError;

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

/// Dispatch one request. `target` is the request path including any query string.
pub fn route_request(tracker: &Tracker, method: &str, target: &str) -> HttpResponse {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let path = path.trim_end_matches('/');

    match (method, path) {
        ("GET", "/api/health") => json_response(api::health_payload()),
        ("GET", "/api/levels") => json_response(api::levels_payload(tracker)),
        ("GET", "/api/snapshot") => json_response(api::snapshot_payload(tracker)),
        ("GET", "/api/views") => json_response(api::views_payload(tracker)),
        (method, path) if method == "GET" && path.starts_with("/api/views/") => {
            let mut segments = path.trim_start_matches("/api/views/").split('/');
            let (Some(level), Some(view), None) =
                (segments.next(), segments.next(), segments.next())
            else {
                return error_response(404, "Route not found");
            };
            match api::view_payload(tracker, level, view, query) {
                Ok(payload) => ok_json(payload),
                Err(api::ViewPayloadError::View(err)) => view_error_response(&err),
                Err(api::ViewPayloadError::Serialize(err)) => {
                    error!(error = %err, "failed to serialize view");
                    error_response(500, &err.to_string())
                }
            }
        }
        _ => error_response(404, "Route not found"),
    }
}

fn json_response(payload: Result<String, serde_json::Error>) -> HttpResponse {
    match payload {
        Ok(payload) => ok_json(payload),
        Err(err) => error_response(500, &err.to_string()),
    }
}

fn ok_json(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        content_type: "application/json",
        body,
    }
}

fn view_error_response(err: &ViewError) -> HttpResponse {
    match err {
        ViewError::UnknownLevel(_) | ViewError::UnknownView(_) | ViewError::LevelUnavailable(_) => {
            error_response(404, &err.to_string())
        }
        ViewError::InvalidParameter { .. } => error_response(400, &err.to_string()),
        ViewError::Engine(_) => {
            error!(error = %err, "view computation failed");
            error_response(500, &err.to_string())
        }
    }
}

fn error_response(status_code: u16, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
