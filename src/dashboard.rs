//! The prepared dashboard state and the per-interaction computation.
//!
//! [`Dashboard::new`] runs once at startup; after that the value is only read,
//! so it can sit behind an `Arc` and be shared by every request.

use serde::Serialize;
use serde_json::Value;

use crate::figure;
use crate::geo::BoundaryLookup;
use crate::reports::{aggregate_sales, compare_regions, top_regions};
use crate::types::{AggregatedRow, Metric, Query, SalesRecord, TopRow};
use crate::util::month_label;

/// How many regions the ranking table shows.
pub const TOP_N: usize = 5;

pub struct Dashboard {
    table: Vec<AggregatedRow>,
    boundaries: BoundaryLookup,
    years: Vec<i32>,
    months: Vec<u32>,
}

/// Result of one interaction: the map and the ranking table.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub figure: Value,
    pub top: Vec<TopRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectOption<T> {
    pub label: String,
    pub value: T,
}

/// Everything the page needs to build its four selectors.
#[derive(Debug, Clone, Serialize)]
pub struct SelectorOptions {
    pub years: Vec<SelectOption<i32>>,
    pub months: Vec<SelectOption<u32>>,
    pub metrics: Vec<SelectOption<Metric>>,
    pub defaults: Option<Query>,
}

impl Dashboard {
    pub fn new(records: &[SalesRecord], boundaries: BoundaryLookup) -> Self {
        let table = aggregate_sales(records);

        let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        let mut months: Vec<u32> = table.iter().map(|r| r.month).collect();
        months.sort_unstable();
        months.dedup();

        let mut regions: Vec<&str> = table.iter().map(|r| r.region.as_str()).collect();
        regions.dedup();
        for region in regions {
            if !boundaries.contains(region) {
                tracing::warn!("Region '{}' has no boundary feature and will not be drawn", region);
            }
        }

        tracing::debug!(
            "Dashboard ready: {} aggregated rows, {} years, {} months",
            table.len(),
            years.len(),
            months.len()
        );
        Self {
            table,
            boundaries,
            years,
            months,
        }
    }

    pub fn table(&self) -> &[AggregatedRow] {
        &self.table
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn months(&self) -> &[u32] {
        &self.months
    }

    /// First year against last year, first month, sales.
    pub fn default_query(&self) -> Option<Query> {
        Some(Query {
            year1: *self.years.first()?,
            year2: *self.years.last()?,
            month: *self.months.first()?,
            metric: Metric::default(),
        })
    }

    pub fn options(&self) -> SelectorOptions {
        SelectorOptions {
            years: self
                .years
                .iter()
                .map(|y| SelectOption { label: y.to_string(), value: *y })
                .collect(),
            months: self
                .months
                .iter()
                .map(|m| SelectOption { label: month_label(*m), value: *m })
                .collect(),
            metrics: Metric::ALL
                .iter()
                .map(|m| SelectOption { label: m.label().to_string(), value: *m })
                .collect(),
            defaults: self.default_query(),
        }
    }

    pub fn compute(&self, query: &Query) -> DashboardView {
        compute(query, &self.table, &self.boundaries)
    }
}

/// Filter, join and rank for one interaction. No hidden state.
pub fn compute(query: &Query, table: &[AggregatedRow], boundaries: &BoundaryLookup) -> DashboardView {
    let rows = compare_regions(table, query.year1, query.year2, query.month, query.metric);
    tracing::debug!(
        "{} {} vs {} month {}: {} regions after join",
        query.metric,
        query.year1,
        query.year2,
        query.month,
        rows.len()
    );
    DashboardView {
        figure: figure::choropleth(&rows, boundaries, query),
        top: top_regions(&rows, query.metric, TOP_N),
    }
}
