use std::time::Duration;

use reqwest::{StatusCode, Url};

use super::{payload::parse_payload, FetchResult, Fetcher};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error};

pub const DEFAULT_ENDPOINT: &str = "https://openapi.airkorea.or.kr/openapi/services/rest/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty";

const USER_AGENT: &str = concat!("airkorea/", env!("CARGO_PKG_VERSION"));

/// HTTP fetcher for the AirKorea real-time measurement service.
#[derive(Clone)]
pub struct AirKoreaClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl AirKoreaClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, endpoint })
    }

    /// Request for the single most recent record of `station`.
    ///
    /// Service keys are often issued already percent-encoded, so the key is
    /// appended as given instead of being encoded a second time.
    pub fn request_url(&self, station: &str, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("stationName", station)
            .append_pair("dataTerm", "month")
            .append_pair("pageNo", "1")
            .append_pair("numOfRows", "1")
            .append_pair("_returnType", "json");

        let query = format!("{}&ServiceKey={}", url.query().unwrap_or_default(), api_key);
        url.set_query(Some(&query));
        url
    }
}

impl Fetcher for AirKoreaClient {
    async fn fetch(&self, station: &str, api_key: &str) -> FetchResult {
        let url = self.request_url(station, api_key);
        log_debug!("requesting latest measurement for station {station}");

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                log_error!("request for station {station} failed: {err}");
                return FetchResult::TransportError(describe(&err));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            log_error!("Response: {status}");
            return FetchResult::HttpError(status.as_u16());
        }

        match response.bytes().await {
            Ok(body) => parse_payload(&body),
            Err(err) => {
                log_error!("reading response body failed: {err}");
                FetchResult::TransportError(describe(&err))
            }
        }
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
