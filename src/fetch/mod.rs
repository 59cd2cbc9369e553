pub mod client;
pub mod payload;

use std::future::Future;

pub use client::{AirKoreaClient, DEFAULT_ENDPOINT};
pub use payload::Measurement;

/// Outcome of one request. Fetchers never return `Err` or panic; every
/// failure is one of these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Success(Measurement),
    /// Non-200 response.
    HttpError(u16),
    /// Network, DNS, TLS or timeout failure.
    TransportError(String),
    /// 200 with a body that is not JSON or has no record.
    MalformedData(String),
}

/// Source of the latest measurement for a station.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, station: &str, api_key: &str) -> impl Future<Output = FetchResult> + Send;
}
