//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every script and workflow produces:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters for RPC failures and submitted transactions)
//!
//! Consumers:
//!     → Terminal or log aggregation (plain or JSON lines)
//!     → Any `metrics` recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted messages
//! - Logs go to stderr so stdout stays machine-readable JSON
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
