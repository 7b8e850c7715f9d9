//! Choropleth figure description for plotly.js.

use serde_json::{json, Value};

use crate::geo::BoundaryLookup;
use crate::types::{ComparisonRow, Query};

pub const COLOR_SCALE: &str = "YlGnBu";
pub const MAP_WIDTH: u32 = 1200;
pub const MAP_HEIGHT: u32 = 600;

/// Map title, e.g. `Ventas ($) por Estado (Mes 3 - 2021 vs 2022)`.
pub fn title(query: &Query) -> String {
    format!(
        "{} por Estado (Mes {} - {} vs {})",
        query.metric.label(),
        query.month,
        query.year1,
        query.year2
    )
}

/// Color each matched region by its metric value.
///
/// Regions without a boundary feature and rows whose metric is undefined are
/// left off the map. Geography outside the matched regions is hidden and
/// the view fits their bounds.
pub fn choropleth(rows: &[ComparisonRow], boundaries: &BoundaryLookup, query: &Query) -> Value {
    let mut locations: Vec<&str> = Vec::with_capacity(rows.len());
    let mut values: Vec<f64> = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(value) = row.metric_value(query.metric) else {
            continue;
        };
        if !boundaries.contains(&row.region) {
            tracing::warn!("No boundary for region '{}', left off the map", row.region);
            continue;
        }
        locations.push(&row.region);
        values.push(value);
    }

    json!({
        "data": [{
            "type": "choropleth",
            "geojson": boundaries.subset(locations.iter().copied()),
            "featureidkey": "properties.name",
            "locations": locations,
            "z": values,
            "colorscale": COLOR_SCALE,
            "reversescale": true,
            "colorbar": { "title": { "text": query.metric.as_str() } },
            "hovertemplate": "%{location}<br>%{z:,.2f}<extra></extra>",
        }],
        "layout": {
            "title": { "text": title(query) },
            "geo": { "fitbounds": "locations", "visible": false },
            "width": MAP_WIDTH,
            "height": MAP_HEIGHT,
            "margin": { "l": 0, "r": 0, "t": 50, "b": 0 },
        }
    })
}
