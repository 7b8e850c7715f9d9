//! Regional sales choropleth dashboard.
//!
//! Loads a sales CSV, normalizes state names, aggregates by region, year and
//! month, and serves a map plus a top-5 table driven by four selectors.

pub mod dashboard;
pub mod error;
pub mod figure;
pub mod geo;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod server;
pub mod types;
pub mod util;

pub use dashboard::{Dashboard, DashboardView, compute};
pub use error::{DashboardError, DashboardResult};
pub use geo::BoundaryLookup;
pub use types::{Metric, Query};
