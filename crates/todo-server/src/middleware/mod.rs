pub mod session_middleware;
pub mod tracing_middleware;

pub use session_middleware::SessionMiddleware;
pub use tracing_middleware::{RequestTrace, TracingMiddleware, TRACE_ID_HEADER};
