//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (no caching, no framing, no indexing)
//! 5. Admin gate (`RequireAdmin` extractor on every data route)

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::RequireAdmin;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
