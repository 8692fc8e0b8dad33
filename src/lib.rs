//! @ai:module:intent Client library for the VarSome variant annotation API
//! @ai:module:layer infrastructure
//! @ai:module:public_api client, config, error, input, output, query
//!
//! # variantapi
//!
//! Looks up genomic variants against `https://api.varsome.com`, splitting large
//! batches into chunks and mapping documented HTTP failures to typed errors.
//! The library only emits `tracing` events; installing a subscriber is left to
//! the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use variantapi::{ClientConfig, VariantApi, VariantApiClient};
//!
//! # async fn run() -> variantapi::Result<()> {
//! let client = VariantApiClient::new(ClientConfig::with_api_key("my-key"))?;
//!
//! let single = client.lookup("rs113488022", None, Some("hg38")).await?;
//! println!("{}", single["chromosome"]);
//!
//! let variants = vec!["BRAF:V600E".to_string(), "TP53:R175L".to_string()];
//! let batch = client.batch_lookup(&variants, None, None).await?;
//! assert_eq!(batch.len(), variants.len());
//!
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod query;

pub use client::{
    batch_lookup_segments, endpoint_url, lookup_segments, RequestParams, VariantApi,
    VariantApiClient, DEFAULT_REF_GENOME,
};
pub use config::{load_api_key, resolve_api_key, ClientConfig, DEFAULT_API_URL};
pub use error::{describe_status, Error, Result};
pub use input::{parse_params, read_variants};
pub use output::{format_result, is_empty_result, render_result, OutputFormat};
pub use query::{run_query, QueryRequest};
