//! @ai:module:intent Read variant lists and request parameters supplied on the command line
//! @ai:module:layer infrastructure
//! @ai:module:public_api read_variants, parse_variants, parse_params
//! @ai:module:stateless true

use crate::client::RequestParams;
use crate::error::{Error, Result};
use std::path::Path;

/// @ai:intent Read variants from a line-delimited file
/// @ai:effects fs:read
pub fn read_variants(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let variants = parse_variants(&content);
    tracing::debug!("Read {} variants from {}", variants.len(), path.display());
    Ok(variants)
}

/// @ai:intent Split file content into variant identifiers
/// @ai:post no entry is empty
/// @ai:example ("BRAF:V600E\n\nrs113488022\n") -> ["BRAF:V600E", "rs113488022"]
/// @ai:edge_cases CSV line -> first field only
/// @ai:edge_cases line starting with '#' -> skipped
/// @ai:effects pure
pub fn parse_variants(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let first = line.split(',').next().unwrap_or(line).trim();
            (!first.is_empty()).then(|| first.to_string())
        })
        .collect()
}

/// @ai:intent Parse key=value strings into request parameters
/// @ai:example (["add-all-data=1", "expand-pubmed-articles=0"]) -> {add-all-data: 1, expand-pubmed-articles: 0}
/// @ai:edge_cases value containing '=' -> split on first '=' only
/// @ai:edge_cases repeated key -> last value wins
/// @ai:effects pure
pub fn parse_params<S: AsRef<str>>(raw: &[S]) -> Result<RequestParams> {
    let mut params = RequestParams::new();

    for item in raw {
        let item = item.as_ref();
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| Error::InvalidParameter(item.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidParameter(item.to_string()));
        }
        params.insert(key.to_string(), value.trim().to_string());
    }

    Ok(params)
}
