//! HTTP plumbing under the orchestrator: URL construction with
//! bracket-notation parameter flattening, log redaction, and the reqwest
//! transport. Nothing in this module retries or rate-limits; that is
//! layered on top by [`RentoraClient`](crate::RentoraClient).

pub mod params;
pub mod redact;
pub mod transport;

pub use transport::{HttpTransport, RawResponse, ResponseBody};
