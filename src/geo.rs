//! Region boundary lookup.
//!
//! The boundary source is a GeoJSON `FeatureCollection` whose features carry
//! the region label in `properties.name`. It is fetched once at startup and
//! then only read.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{json, Value};

use crate::error::{DashboardError, DashboardResult};

pub const DEFAULT_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/angelnmara/geojson/refs/heads/master/mexicoHigh.json";

/// Region name to GeoJSON feature.
#[derive(Debug, Clone, Default)]
pub struct BoundaryLookup {
    features: BTreeMap<String, Value>,
}

impl BoundaryLookup {
    /// Index a parsed GeoJSON document by `properties.name`.
    ///
    /// Features without a string name are skipped. A later feature with the
    /// same name replaces the earlier one.
    pub fn from_geojson(doc: Value) -> DashboardResult<Self> {
        let Value::Object(mut doc) = doc else {
            return Err(DashboardError::InvalidBoundaries(
                "document is not a JSON object".to_string(),
            ));
        };
        if doc.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(DashboardError::InvalidBoundaries(
                "expected a FeatureCollection".to_string(),
            ));
        }
        let Some(Value::Array(items)) = doc.remove("features") else {
            return Err(DashboardError::InvalidBoundaries(
                "missing features array".to_string(),
            ));
        };

        let mut features = BTreeMap::new();
        let mut unnamed = 0usize;
        for feature in items {
            let name = feature
                .pointer("/properties/name")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string());
            match name {
                Some(name) if !name.is_empty() => {
                    features.insert(name, feature);
                }
                _ => unnamed += 1,
            }
        }
        if unnamed > 0 {
            tracing::warn!("Skipped {} boundary features without a name", unnamed);
        }
        Ok(Self { features })
    }

    /// Fetch the collection over HTTP. Any failure is returned, not retried.
    pub async fn fetch(url: &str) -> DashboardResult<Self> {
        tracing::info!("Downloading region boundaries from {}", url);
        let doc: Value = reqwest::get(url)
            .await?
            .error_for_status()?
            .json()
            .await?;
        Self::from_geojson(doc)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DashboardResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
        Self::from_geojson(serde_json::from_str(&text)?)
    }

    /// Load from an `http(s)://` URL or a local file path.
    pub async fn load(source: &str) -> DashboardResult<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::fetch(source).await
        } else {
            Self::from_file(source)
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// A new collection holding only the named features, in the given order.
    pub fn subset<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Value {
        let features: Vec<&Value> = names
            .into_iter()
            .filter_map(|n| self.features.get(n))
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }
}
