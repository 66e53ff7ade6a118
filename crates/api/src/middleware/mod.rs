//! HTTP middleware components.

pub mod envelope;
pub mod logging;
pub mod maintenance;
pub mod metrics;
pub mod security_headers;
pub mod trace_id;

pub use envelope::{json_error_envelope, not_found};
pub use maintenance::maintenance_guard;
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use security_headers::security_headers_middleware;
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
