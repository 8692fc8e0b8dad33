//! @ai:module:intent Dispatch a user query to a single or batch lookup
//! @ai:module:layer application
//! @ai:module:public_api QueryRequest, run_query
//! @ai:module:depends_on client, error

use crate::client::{RequestParams, VariantApi};
use crate::error::{Error, Result};
use serde_json::Value;

/// @ai:intent A lookup as requested by the user
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub variants: Vec<String>,
    pub params: Option<RequestParams>,
    pub ref_genome: Option<String>,
}

impl QueryRequest {
    pub fn is_batch(&self) -> bool {
        self.variants.len() > 1
    }
}

/// @ai:intent Run a single lookup for one variant, a batch lookup for several
/// @ai:pre request.variants is non-empty
/// @ai:effects network
/// @ai:edge_cases several variants on a client without an API key -> MissingApiKey, nothing sent
pub async fn run_query<C: VariantApi>(client: &C, request: &QueryRequest) -> Result<Value> {
    let params = request.params.as_ref();
    let ref_genome = request.ref_genome.as_deref();

    match request.variants.as_slice() {
        [] => Err(Error::InvalidConfig("no variants to look up".to_string())),
        [query] => {
            tracing::info!("Looking up {}", query);
            client.lookup(query, params, ref_genome).await
        }
        variants => {
            if !client.has_api_key() {
                return Err(Error::MissingApiKey);
            }
            tracing::info!("Batch lookup of {} variants", variants.len());
            let results = client.batch_lookup(variants, params, ref_genome).await?;
            Ok(Value::Array(results))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::VariantApiClient;
    use crate::config::ClientConfig;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records calls and answers with fixed values.
    #[derive(Default)]
    struct MockVariantApi {
        calls: Mutex<Vec<String>>,
        api_key: bool,
    }

    impl MockVariantApi {
        fn authenticated() -> Self {
            Self {
                api_key: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl VariantApi for MockVariantApi {
        async fn schema(&self) -> Result<Value> {
            self.calls.lock().unwrap().push("schema".to_string());
            Ok(json!({}))
        }

        async fn lookup(
            &self,
            query: &str,
            _params: Option<&RequestParams>,
            ref_genome: Option<&str>,
        ) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("lookup {} {:?}", query, ref_genome));
            Ok(json!({"query": query}))
        }

        async fn batch_lookup(
            &self,
            variants: &[String],
            params: Option<&RequestParams>,
            _ref_genome: Option<&str>,
        ) -> Result<Vec<Value>> {
            self.calls.lock().unwrap().push(format!(
                "batch {} params={}",
                variants.len(),
                params.map(|p| p.len()).unwrap_or(0)
            ));
            Ok(variants.iter().map(|v| json!({"query": v})).collect())
        }

        fn has_api_key(&self) -> bool {
            self.api_key
        }
    }

    fn request(variants: &[&str]) -> QueryRequest {
        QueryRequest {
            variants: variants.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_single_variant_uses_lookup() {
        let client = MockVariantApi::default();
        let mut req = request(&["rs113488022"]);
        req.ref_genome = Some("hg38".to_string());

        let result = run_query(&client, &req).await.unwrap();
        assert_eq!(result, json!({"query": "rs113488022"}));
        assert_eq!(client.calls(), vec!["lookup rs113488022 Some(\"hg38\")"]);
    }

    #[tokio::test]
    async fn test_several_variants_use_batch() {
        let client = MockVariantApi::authenticated();
        let mut req = request(&["BRAF:V600E", "TP53:R175L"]);
        let mut params = RequestParams::new();
        params.insert("add-all-data".to_string(), "1".to_string());
        req.params = Some(params);

        let result = run_query(&client, &req).await.unwrap();
        assert_eq!(
            result,
            json!([{"query": "BRAF:V600E"}, {"query": "TP53:R175L"}])
        );
        assert_eq!(client.calls(), vec!["batch 2 params=1"]);
    }

    #[tokio::test]
    async fn test_batch_without_key_fails_before_request() {
        let client = MockVariantApi::default();
        let req = request(&["BRAF:V600E", "TP53:R175L"]);

        let result = run_query(&client, &req).await;
        assert!(matches!(result, Err(Error::MissingApiKey)));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_client_cannot_batch() {
        let client = VariantApiClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();

        let result = run_query(&client, &request(&["BRAF:V600E", "TP53:R175L"])).await;
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_no_variants() {
        let client = MockVariantApi::authenticated();
        let result = run_query(&client, &QueryRequest::default()).await;
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert!(client.calls().is_empty());
    }
}
