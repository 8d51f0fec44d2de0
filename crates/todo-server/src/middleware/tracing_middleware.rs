use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::{field, Instrument, Span};
use uuid::Uuid;

/// Accepted on requests and always set on responses.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Per-request log context: the trace id, the session once known, and the
/// span every handler runs in.
#[derive(Clone, Debug)]
pub struct RequestTrace {
    trace_id: String,
    session_id: Option<String>,
    span: Span,
}

impl RequestTrace {
    pub fn new(trace_id: impl Into<String>, span: Span) -> Self {
        Self {
            trace_id: trace_id.into(),
            session_id: None,
            span,
        }
    }

    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        req.extensions().get::<RequestTrace>().cloned()
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_session(&mut self, session_id: &str) {
        self.span.record("session_id", session_id);
        self.session_id = Some(session_id.to_string());
    }

    /// Prefix for log lines, `trace` or `trace/session`.
    pub fn label(&self) -> String {
        match &self.session_id {
            Some(session_id) => format!("{}/{}", self.trace_id, session_id),
            None => self.trace_id.clone(),
        }
    }
}

/// Opens an `http_request` span for every request and echoes its trace id.
///
/// The span's `session_id` field starts empty; session resolution fills it
/// through [`RequestTrace::record_session`].
pub struct TracingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TracingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TracingMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TracingMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct TracingMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TracingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = req
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let span = tracing::info_span!(
            "http_request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path(),
            session_id = field::Empty,
        );
        req.extensions_mut()
            .insert(RequestTrace::new(trace_id.clone(), span.clone()));

        let service = Rc::clone(&self.service);

        Box::pin(
            async move {
                let mut res = service.call(req).await?;

                tracing::debug!("[{}] {}", trace_id, res.status());
                if let Ok(value) = HeaderValue::from_str(&trace_id) {
                    res.headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }

                Ok(res)
            }
            .instrument(span),
        )
    }
}
