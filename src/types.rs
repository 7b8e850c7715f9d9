use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// One line of the sales CSV, kept as loose strings until validated.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "final_region", alias = "region")]
    pub region: Option<String>,
    #[serde(rename = "year")]
    pub year: Option<String>,
    #[serde(rename = "month_num", alias = "month")]
    pub month: Option<String>,
    #[serde(rename = "total_sales")]
    pub total_sales: Option<String>,
    #[serde(rename = "total_items")]
    pub total_items: Option<String>,
}

/// A validated sales row. `region` already holds the canonical name.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub region: String,
    pub year: i32,
    pub month: u32,
    pub total_sales: f64,
    pub total_items: i64,
}

/// Sums of all records sharing `(region, year, month)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub region: String,
    pub year: i32,
    pub month: u32,
    pub total_sales: f64,
    pub total_items: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Growth,
    #[default]
    TotalSales,
    TotalItems,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Growth, Metric::TotalSales, Metric::TotalItems];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Growth => "growth",
            Metric::TotalSales => "total_sales",
            Metric::TotalItems => "total_items",
        }
    }

    /// Label shown in the selector, the map title and the table header.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Growth => "Crecimiento (%)",
            Metric::TotalSales => "Ventas ($)",
            Metric::TotalItems => "Piezas Vendidas",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "growth" => Ok(Metric::Growth),
            "total_sales" | "sales" => Ok(Metric::TotalSales),
            "total_items" | "items" => Ok(Metric::TotalItems),
            other => Err(DashboardError::InvalidQuery(format!("unknown metric '{}'", other))),
        }
    }
}

/// Two years of one region for the same month, side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub region: String,
    pub sales_year1: f64,
    pub sales_year2: f64,
    pub items_year1: i64,
    pub items_year2: i64,
    /// `None` when year1 sales are zero and growth is undefined.
    pub growth_pct: Option<f64>,
}

impl ComparisonRow {
    /// Value of the active metric, `None` if it is undefined for this row.
    pub fn metric_value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Growth => self.growth_pct,
            Metric::TotalSales => Some(self.sales_year2),
            Metric::TotalItems => Some(self.items_year2 as f64),
        }
    }
}

/// The inputs of one dashboard interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub year1: i32,
    pub year2: i32,
    pub month: u32,
    #[serde(default)]
    pub metric: Metric,
}

/// A row of the top-regions table.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TopRow {
    #[serde(rename = "region")]
    #[tabled(rename = "Estado")]
    pub region: String,
    #[serde(rename = "metric")]
    #[tabled(rename = "Métrica")]
    pub metric: f64,
}
