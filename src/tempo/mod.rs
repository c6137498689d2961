//! EDF Tempo colour API integration
//!
//! Split into the endpoint catalog, the HTTP transport seam, the single-shot
//! fetcher and the aggregating poller that fans out over every endpoint.

pub mod endpoints;
pub mod fetcher;
pub mod poller;
pub mod transport;

// Re-exports for the public API surface
pub use endpoints::{ENDPOINT_CATALOG, Endpoint, EndpointSet};
pub use fetcher::Fetcher;
pub use poller::{PollOutcome, Poller};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
