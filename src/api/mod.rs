//! HTTP surface of the report simplifier.
//!
//! `report_api_router()` returns a composable `Router`; `server` owns the
//! bind/serve/shutdown lifecycle around it.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::report_api_router;
pub use server::{serve_until_ctrl_c, start_report_server, ReportServer};
pub use types::AppState;
