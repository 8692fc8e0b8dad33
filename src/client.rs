//! @ai:module:intent HTTP client for the VarSome variant annotation API
//! @ai:module:layer infrastructure
//! @ai:module:public_api VariantApi, VariantApiClient, RequestParams, endpoint_url, lookup_segments, batch_lookup_segments
//! @ai:module:depends_on config, error
//! @ai:module:stateless false

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

pub const SCHEMA_SEGMENTS: [&str; 2] = ["lookup", "schema"];
const LOOKUP_SEGMENT: &str = "lookup";
const BATCH_SEGMENT: &str = "batch";

/// Genome build the batch endpoint is addressed with when none is given.
pub const DEFAULT_REF_GENOME: &str = "hg19";

/// Query-string parameters forwarded verbatim to the service.
pub type RequestParams = BTreeMap<String, String>;

/// @ai:intent Operations offered by the annotation service
#[allow(async_fn_in_trait)]
pub trait VariantApi: Send + Sync {
    /// @ai:intent Fetch the description of result fields
    async fn schema(&self) -> Result<Value>;

    /// @ai:intent Annotate a single variant
    async fn lookup(
        &self,
        query: &str,
        params: Option<&RequestParams>,
        ref_genome: Option<&str>,
    ) -> Result<Value>;

    /// @ai:intent Annotate many variants, one result entry per input in input order
    async fn batch_lookup(
        &self,
        variants: &[String],
        params: Option<&RequestParams>,
        ref_genome: Option<&str>,
    ) -> Result<Vec<Value>>;

    /// @ai:intent Whether requests carry an API key
    fn has_api_key(&self) -> bool;
}

/// @ai:intent Path segments of a single-variant lookup
/// @ai:example ("BRAF:V600E", None) -> ["lookup", "BRAF:V600E"]
/// @ai:example ("rs113488022", Some("hg38")) -> ["lookup", "rs113488022", "hg38"]
/// @ai:effects pure
pub fn lookup_segments<'a>(query: &'a str, ref_genome: Option<&'a str>) -> Vec<&'a str> {
    let mut segments = vec![LOOKUP_SEGMENT, query];
    segments.extend(ref_genome);
    segments
}

/// @ai:intent Path segments of a batch lookup, defaulting the genome build to hg19
/// @ai:effects pure
pub fn batch_lookup_segments(ref_genome: Option<&str>) -> [&str; 3] {
    [
        LOOKUP_SEGMENT,
        BATCH_SEGMENT,
        ref_genome.unwrap_or(DEFAULT_REF_GENOME),
    ]
}

/// @ai:intent Append path segments to the base URL, one segment per item
/// @ai:post '?', '#', '/' and '%' inside a segment are percent-encoded
/// @ai:effects pure
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidConfig(format!("base_url {} cannot carry a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// @ai:intent Batch request body
#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    variants: &'a [String],
}

/// @ai:intent VarSome API client owning one HTTP session
/// @ai:invariant batch_size >= 1
pub struct VariantApiClient {
    http: reqwest::Client,
    base_url: Url,
    batch_size: usize,
    has_api_key: bool,
}

impl VariantApiClient {
    /// @ai:intent Build a client and its HTTP session from configuration
    /// @ai:pre config passes validation
    /// @ai:effects pure
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(config.api_url()).map_err(|e| {
            Error::InvalidConfig(format!("invalid base_url {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "base_url {} cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Token {}", key))
                .map_err(|_| Error::InvalidApiKey)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            batch_size: config.batch_size,
            has_api_key: config.api_key.is_some(),
        })
    }

    /// @ai:intent Client for the public endpoint with an optional key
    /// @ai:effects pure
    pub fn with_api_key(api_key: Option<String>) -> Result<Self> {
        Self::new(ClientConfig {
            api_key,
            ..Default::default()
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// @ai:intent Release the HTTP session
    /// @ai:effects network
    pub fn close(self) {
        tracing::debug!("Closing session to {}", self.base_url);
        drop(self.http);
    }

    /// @ai:intent Issue a GET and decode the JSON body
    /// @ai:effects network
    async fn get(&self, segments: &[&str], params: Option<&RequestParams>) -> Result<Value> {
        let url = endpoint_url(&self.base_url, segments)?;
        tracing::debug!("GET request to {}", url);

        let mut request = self.http.get(url);
        if let Some(params) = params {
            request = request.query(params);
        }
        self.send(request).await
    }

    /// @ai:intent Issue a POST with a JSON body and decode the JSON response
    /// @ai:effects network
    async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        params: Option<&RequestParams>,
        body: &B,
    ) -> Result<Value> {
        let url = endpoint_url(&self.base_url, segments)?;
        tracing::debug!("POST request to {}", url);

        let mut request = self.http.post(url).json(body);
        if let Some(params) = params {
            request = request.query(params);
        }
        self.send(request).await
    }

    /// @ai:intent Send a request, classify failure statuses, decode success bodies
    /// @ai:effects network
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::debug!("Request failed with status {}", status);
            return Err(Error::from_status(status.as_u16()));
        }

        let body = response.bytes().await?;
        tracing::debug!("Response time {:?}", started.elapsed());
        tracing::debug!("Content length {}", body.len());

        Ok(serde_json::from_slice(&body)?)
    }
}

impl VariantApi for VariantApiClient {
    /// @ai:effects network
    async fn schema(&self) -> Result<Value> {
        self.get(&SCHEMA_SEGMENTS, None).await
    }

    /// @ai:pre query is non-empty
    /// @ai:effects network
    async fn lookup(
        &self,
        query: &str,
        params: Option<&RequestParams>,
        ref_genome: Option<&str>,
    ) -> Result<Value> {
        self.get(&lookup_segments(query, ref_genome), params).await
    }

    /// @ai:intent Post variants in chunks of batch_size and concatenate results
    /// @ai:post result.len() == sum of per-chunk response lengths, in chunk order
    /// @ai:effects network
    /// @ai:edge_cases empty input -> no request, empty result
    /// @ai:edge_cases failure on any chunk -> whole call fails, earlier chunks discarded
    async fn batch_lookup(
        &self,
        variants: &[String],
        params: Option<&RequestParams>,
        ref_genome: Option<&str>,
    ) -> Result<Vec<Value>> {
        let segments = batch_lookup_segments(ref_genome);
        let mut results = Vec::with_capacity(variants.len());

        for (index, chunk) in variants.chunks(self.batch_size).enumerate() {
            tracing::debug!("Posting chunk {} with {} variants", index, chunk.len());

            match self.post(&segments, params, &BatchRequest { variants: chunk }).await? {
                Value::Array(items) => results.extend(items),
                other => {
                    return Err(Error::UnexpectedResponse(format!(
                        "batch chunk {} returned {} instead of an array",
                        index,
                        json_kind(&other)
                    )))
                }
            }
        }

        Ok(results)
    }

    fn has_api_key(&self) -> bool {
        self.has_api_key
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
