//! HTTP routes for the dashboard page and its JSON API.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query as AxumQuery, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;

use crate::dashboard::Dashboard;
use crate::error::{DashboardError, DashboardResult};
use crate::types::{Metric, Query};

const INDEX_HTML: &str = include_str!("page.html");

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Raw `/api/view` parameters. The metric is parsed separately so a bad
/// value gets a readable error.
#[derive(Debug, Deserialize)]
pub struct ViewParams {
    pub year1: i32,
    pub year2: i32,
    pub month: u32,
    pub metric: Option<String>,
}

impl TryFrom<ViewParams> for Query {
    type Error = DashboardError;

    fn try_from(p: ViewParams) -> Result<Self, Self::Error> {
        let metric = match p.metric.as_deref() {
            Some(m) => m.parse::<Metric>()?,
            None => Metric::default(),
        };
        Ok(Query {
            year1: p.year1,
            year2: p.year2,
            month: p.month,
            metric,
        })
    }
}

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        let status = match e {
            DashboardError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

/// Create the router with all routes.
pub fn create_router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/options", get(options_handler))
        .route("/api/view", get(view_handler))
        .with_state(dashboard)
}

/// Bind and serve until the process is stopped.
pub async fn serve(dashboard: Arc<Dashboard>, config: ServerConfig) -> DashboardResult<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let server_error = |e: std::io::Error| DashboardError::Server {
        addr: addr.clone(),
        message: e.to_string(),
    };
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(server_error)?;
    tracing::info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, create_router(dashboard))
        .await
        .map_err(server_error)?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn options_handler(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    Json(dashboard.options())
}

async fn view_handler(
    State(dashboard): State<Arc<Dashboard>>,
    params: Result<AxumQuery<ViewParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let AxumQuery(params) = params.map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.body_text()))?;
    let query = Query::try_from(params)?;
    Ok(Json(dashboard.compute(&query)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::BoundaryLookup;
    use crate::types::SalesRecord;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let boundaries = BoundaryLookup::from_geojson(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "name": "Jalisco" }, "geometry": null }
            ]
        }))
        .unwrap();
        let records = vec![
            SalesRecord { region: "Jalisco".into(), year: 2021, month: 1, total_sales: 200.0, total_items: 2 },
            SalesRecord { region: "Jalisco".into(), year: 2022, month: 1, total_sales: 300.0, total_items: 3 },
        ];
        create_router(Arc::new(Dashboard::new(&records, boundaries)))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 16 * 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn index_serves_page() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn options_include_defaults() {
        let (status, body) = get_json("/api/options").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["defaults"]["year1"], 2021);
        assert_eq!(body["defaults"]["year2"], 2022);
        assert_eq!(body["defaults"]["metric"], "total_sales");
        assert_eq!(body["metrics"][0]["value"], "growth");
    }

    #[tokio::test]
    async fn view_returns_figure_and_top_rows() {
        let (status, body) = get_json("/api/view?year1=2021&year2=2022&month=1&metric=growth").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["top"], json!([{ "region": "Jalisco", "metric": 50.0 }]));
        assert_eq!(
            body["figure"]["layout"]["title"]["text"],
            "Crecimiento (%) por Estado (Mes 1 - 2021 vs 2022)"
        );
    }

    #[tokio::test]
    async fn view_rejects_unknown_metric() {
        let (status, body) = get_json("/api/view?year1=2021&year2=2022&month=1&metric=profit").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("profit"));
    }

    #[tokio::test]
    async fn bind_failure_names_the_address() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let dashboard = Arc::new(Dashboard::new(&[], BoundaryLookup::default()));
        let config = ServerConfig { host: "127.0.0.1".to_string(), port };
        let err = serve(dashboard, config).await.unwrap_err();
        assert!(matches!(err, DashboardError::Server { .. }));
        assert!(err.to_string().contains(&format!("127.0.0.1:{}", port)));
    }

    #[tokio::test]
    async fn view_rejects_missing_year() {
        let (status, body) = get_json("/api/view?year2=2022&month=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
