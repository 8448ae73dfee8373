//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → server.rs (Axum setup, request ID, timeout, tracing)
//!     → request.rs (client IP, request ID)
//!     → [routing layer picks a server and builds the redirect]
//!     → response.rs (301 redirect, pool snapshot rows)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{client_ip, UuidRequestId, X_FORWARDED_FOR, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
