pub mod health;
pub mod lists;
pub mod todos;

use actix_web::{http::header, HttpRequest, HttpResponse};
use serde_json::json;
use todo_core::TodoError;

use crate::middleware::RequestTrace;
use crate::session::SessionData;

pub const LISTS_PATH: &str = "/lists";
pub const ASYNC_REQUEST_HEADER: &str = "X-Requested-With";
pub const ASYNC_REQUEST_VALUE: &str = "XMLHttpRequest";

pub fn list_path(index: usize) -> String {
    format!("{}/{}", LISTS_PATH, index)
}

/// `303 See Other`, so the browser follows a POST with a GET.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Whether the client made a background request and expects a terse reply.
pub fn is_async_request(req: &HttpRequest) -> bool {
    req.headers()
        .get(ASYNC_REQUEST_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case(ASYNC_REQUEST_VALUE))
        .unwrap_or(false)
}

/// Reports a missing list or todo.
///
/// Background requests get a 404 with the message; everything else gets
/// the message as an error flash and a redirect to the list index.
pub fn not_found(req: &HttpRequest, session: &mut SessionData, error: TodoError) -> HttpResponse {
    let trace = RequestTrace::from_request(req)
        .unwrap_or_else(|| RequestTrace::new("-", tracing::Span::none()));
    trace.span().in_scope(|| {
        tracing::warn!("[{}] {} {}: {}", trace.label(), req.method(), req.path(), error)
    });

    if is_async_request(req) {
        return HttpResponse::NotFound().json(json!({ "error": error.to_string() }));
    }

    session.set_error(error.to_string());
    redirect(LISTS_PATH)
}
