use axum::{
    body::boxed,
    extract::{Path, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hyper::{Body, Server};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, info_span, Instrument, Span};

use crate::catalog::DatasetCatalog;
use crate::config::Config;
use crate::constants::NDJSON_CONTENT_TYPE;
use crate::error::ParcelError;
use crate::metrics::{self, MetricName};
use crate::parcel::{ColumnMap, LookupTables, RowTransformer};
use crate::pipeline::{BodySink, RowStream, StreamingPipeline};

/// Read-only state shared by every request.
#[derive(Debug)]
pub struct AppState {
    pub catalog: DatasetCatalog,
    pub tables: Arc<LookupTables>,
    pub columns: Arc<ColumnMap>,
}

impl AppState {
    pub fn new(catalog: DatasetCatalog, tables: LookupTables, columns: ColumnMap) -> Self {
        Self {
            catalog,
            tables: Arc::new(tables),
            columns: Arc::new(columns),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            DatasetCatalog::new(&config.data.dir),
            config.zoning.clone(),
            config.columns.clone(),
        )
    }
}

/// Outcomes that end a request before any records are sent.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "CSV file not found".to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "parcel_stream",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_text() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

async fn list_datasets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let datasets = state.catalog.list().await.map_err(|e| {
        error!("Failed to list datasets: {}", e);
        ApiError::Internal(e.to_string())
    })?;
    Ok(Json(json!({ "datasets": datasets })))
}

/// Streams one county's parcels as NDJSON.
///
/// Decoding happens on the response task and waits on the body, so a slow client holds
/// no thread.
///
/// The first row is read before the response is committed, so a source that cannot be
/// decoded at all still gets a 500. Once output has started, a source error aborts the
/// body and the client sees a truncated stream.
async fn stream_parcels(
    State(state): State<Arc<AppState>>,
    Path(county): Path<String>,
) -> Result<Response, ApiError> {
    let span = info_span!("parcels", county = %county);
    async move {
        let file = match state.catalog.open(&county).await {
            Ok(file) => file,
            Err(ParcelError::DatasetNotFound(_)) => {
                info!("Dataset not found");
                metrics::increment(MetricName::DatasetsNotFound, 1);
                return Err(ApiError::NotFound);
            }
            Err(e) => {
                error!("Failed to open dataset: {}", e);
                return Err(ApiError::Internal(e.to_string()));
            }
        };

        let mut rows = RowStream::new(file);
        if let Some(Err(e)) = rows.peek().await {
            error!("Stream error before output: {}", e);
            metrics::increment(MetricName::StreamsFailed, 1);
            return Err(ApiError::Internal(e.to_string()));
        }

        let transformer =
            RowTransformer::for_current_year(state.tables.clone(), state.columns.clone());
        let mut pipeline = StreamingPipeline::new(county.clone(), transformer);
        let (sender, body) = Body::channel();
        metrics::increment(MetricName::StreamsStarted, 1);

        // The task lives only as long as the body. Once hyper drops it the next write
        // fails and the pipeline returns, closing the file.
        tokio::spawn(
            async move {
                let mut sink = BodySink::new(sender);
                if let Err(e) = pipeline.run(rows, &mut sink).await {
                    debug!("Stream ended early: {}", e);
                }
            }
            .instrument(Span::current()),
        );

        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .body(boxed(body))
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
    .instrument(span)
    .await
}

/// Create the HTTP router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/api/parcels", get(list_datasets))
        .route("/api/parcels/:county", get(stream_parcels))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn start_server(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);

    info!("HTTP server running on http://{}", addr);
    info!("Parcels: http://{}/api/parcels/<county>", addr);

    Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;

    Ok(())
}
