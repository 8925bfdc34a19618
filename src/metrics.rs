//! Process metrics for the parcel stream service.
//!
//! Counters go through the `metrics` facade. A Prometheus recorder is installed once at
//! startup and rendered by the `/metrics` route.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Every metric the service records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RowsEnriched,
    RowDiagnostics,
    StreamsStarted,
    StreamsCompleted,
    StreamsFailed,
    DatasetsNotFound,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RowsEnriched => "parcel_rows_enriched_total",
            MetricName::RowDiagnostics => "parcel_row_diagnostics_total",
            MetricName::StreamsStarted => "parcel_streams_started_total",
            MetricName::StreamsCompleted => "parcel_streams_completed_total",
            MetricName::StreamsFailed => "parcel_streams_failed_total",
            MetricName::DatasetsNotFound => "parcel_datasets_not_found_total",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            MetricName::RowsEnriched => "Rows transformed and written to a consumer",
            MetricName::RowDiagnostics => "Non-fatal issues found while enriching rows",
            MetricName::StreamsStarted => "Dataset streams that began sending output",
            MetricName::StreamsCompleted => "Dataset streams that reached end of input",
            MetricName::StreamsFailed => "Dataset streams ended by a source error or disconnect",
            MetricName::DatasetsNotFound => "Requests for datasets that do not exist",
        }
    }

    pub fn all() -> [MetricName; 6] {
        [
            MetricName::RowsEnriched,
            MetricName::RowDiagnostics,
            MetricName::StreamsStarted,
            MetricName::StreamsCompleted,
            MetricName::StreamsFailed,
            MetricName::DatasetsNotFound,
        ]
    }
}

/// Installs the Prometheus recorder. Idempotent; later calls return the first handle.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    if let Some(handle) = HANDLE.get() {
        return Some(handle);
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let handle = HANDLE.get_or_init(|| handle);
            for name in MetricName::all() {
                ::metrics::describe_counter!(name.as_str(), name.help());
            }
            info!("Prometheus recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            HANDLE.get()
        }
    }
}

/// Prometheus text exposition, empty when no recorder is installed.
pub fn render() -> String {
    HANDLE.get().map(|h| h.render()).unwrap_or_default()
}

pub fn increment(name: MetricName, by: u64) {
    ::metrics::counter!(name.as_str()).increment(by);
}
