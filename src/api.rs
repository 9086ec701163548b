// API client module: a small blocking HTTP client that talks to the DSTN
// lookup endpoint. One GET per query, no retries; the caller decides what
// to do with each outcome.

use crate::config::{Config, ResultParams};
use crate::error::{DstnError, Result};
use crate::students::StudentQuery;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One row of the upstream response, untouched.
pub type RawRecord = Map<String, Value>;

/// Supplies the per-query parameters appended after the fixed result
/// parameters.
pub trait QueryBuilder {
    fn query_params(&self) -> Vec<(&'static str, String)>;
}

impl QueryBuilder for StudentQuery {
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![("masv", self.name.clone()), ("sobang", self.degree_id.clone())]
    }
}

/// Expected body of a 200 response.
#[derive(Deserialize, Debug)]
struct DstnResponse {
    total: u64,
    #[serde(default)]
    rows: Vec<RawRecord>,
}

/// What a single `fetch` produced.
#[derive(Debug)]
pub enum FetchOutcome {
    Found(Vec<RawRecord>),
    NotFound,
    HttpError(HttpFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Any status other than 200.
    Status(u16),
    Timeout,
    Connection(String),
    /// 200, but the body is not `{ total, rows }` JSON.
    Malformed(String),
}

/// An HTTP-level failure plus whatever the server (or transport) gave
/// back, kept for the error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    pub kind: FailureKind,
    pub body: String,
}

impl HttpFailure {
    pub fn new(kind: FailureKind, body: impl Into<String>) -> Self {
        HttpFailure {
            kind,
            body: body.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::Status(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FailureKind::Status(code) => {
                let reason = StatusCode::from_u16(*code)
                    .ok()
                    .and_then(|s| s.canonical_reason());
                match reason {
                    Some(reason) => write!(f, "HTTP error {} ({})", code, reason),
                    None => write!(f, "HTTP error {}", code),
                }
            }
            FailureKind::Timeout => write!(f, "HTTP error: connection timeout"),
            FailureKind::Connection(msg) => write!(f, "HTTP error: {}", msg),
            FailureKind::Malformed(msg) => write!(f, "HTTP error: unexpected response body ({})", msg),
        }
    }
}

/// Holds a reqwest blocking client (with the static headers and timeout
/// baked in), the endpoint URL and the fixed result parameters.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_url: String,
    results: ResultParams,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .default_headers(build_headers(&config.headers)?)
            .timeout(config.timeout())
            .build()?;
        Ok(ApiClient {
            client,
            api_url: config.api_url.trim().to_string(),
            results: config.results.clone(),
        })
    }

    /// Full parameter list for one query: `rows`, `page`, `sord`, then the
    /// query's own fields.
    pub fn params_for(&self, query: &dyn QueryBuilder) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("rows", self.results.rows.to_string()),
            ("page", self.results.page.to_string()),
            ("sord", self.results.sord.clone()),
        ];
        params.extend(query.query_params());
        params
    }

    /// Issue one GET and classify the result.
    pub fn fetch(&self, query: &dyn QueryBuilder) -> FetchOutcome {
        let params = self.params_for(query);
        log::debug!("GET {} {:?}", self.api_url, params);

        let res = match self.client.get(&self.api_url).query(&params).send() {
            Ok(res) => res,
            Err(e) => return FetchOutcome::HttpError(transport_failure(e)),
        };
        let status = res.status();
        log::debug!("Response status {}", status);

        let body = match res.text() {
            Ok(body) => body,
            Err(e) => return FetchOutcome::HttpError(transport_failure(e)),
        };
        if status != StatusCode::OK {
            return FetchOutcome::HttpError(HttpFailure::new(FailureKind::Status(status.as_u16()), body));
        }

        match serde_json::from_str::<DstnResponse>(&body) {
            Ok(resp) if resp.total == 0 => FetchOutcome::NotFound,
            Ok(resp) => {
                log::debug!("{} record(s) found", resp.total);
                FetchOutcome::Found(resp.rows)
            }
            Err(e) => FetchOutcome::HttpError(HttpFailure::new(FailureKind::Malformed(e.to_string()), body)),
        }
    }
}

fn transport_failure(e: reqwest::Error) -> HttpFailure {
    let kind = if e.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Connection(e.to_string())
    };
    HttpFailure::new(kind, e.to_string())
}

/// Turn the configured header mapping into a `HeaderMap`, rejecting names
/// or values reqwest would refuse to send.
fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| DstnError::Config(format!("invalid header name '{}'", name)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| DstnError::Config(format!("invalid value for header '{}'", name)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
