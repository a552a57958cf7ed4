//! ARC-3 metadata rendering.
//!
//! Builds the canonical metadata document published alongside each asset.
//! The serialized bytes, not the in-memory record, are what get
//! content-addressed, so properties use a sorted map to keep the output
//! reproducible across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata document for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc3Metadata {
    /// Display name: configured prefix + asset number
    pub name: String,
    /// Collection-wide description
    pub description: String,
    /// Image URI, `ipfs://<cid>`
    pub image: String,
    /// Per-asset trait map
    pub properties: BTreeMap<String, String>,
}

/// Render the canonical metadata document for one asset.
///
/// Pure function of its inputs; the only failure mode is serialization,
/// which callers treat as fatal rather than recoverable.
pub fn render(
    name_prefix: &str,
    description: &str,
    asset_number: &str,
    traits: BTreeMap<String, String>,
    image_cid: &str,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&Arc3Metadata {
        name: format!("{}{}", name_prefix, asset_number),
        description: description.to_string(),
        image: format!("ipfs://{}", image_cid),
        properties: traits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_traits() -> BTreeMap<String, String> {
        BTreeMap::from([("color".to_string(), "red".to_string())])
    }

    #[test]
    fn test_render_known_document() {
        let bytes = render("Widget#", "A widget", "007", sample_traits(), "bafy123").unwrap();
        let document: Arc3Metadata = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(document.name, "Widget#007");
        assert_eq!(document.description, "A widget");
        assert_eq!(document.image, "ipfs://bafy123");
        assert_eq!(document.properties, sample_traits());
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = render("Widget#", "A widget", "007", sample_traits(), "bafy123").unwrap();
        let second = render("Widget#", "A widget", "007", sample_traits(), "bafy123").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_empty_traits() {
        let bytes = render("Widget#", "A widget", "007", BTreeMap::new(), "bafy123").unwrap();
        let document: Arc3Metadata = serde_json::from_slice(&bytes).unwrap();
        assert!(document.properties.is_empty());
    }
}
