//! Bind-outcome metrics.
//!
//! Counters are emitted through the `metrics` facade. Without an installed
//! recorder they are no-ops; [`init_metrics`] installs a Prometheus recorder
//! whose text output is available via [`render_metrics`].
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `bodybind_bindings_total` | Counter | `outcome` | Annotated parameters processed |
//! | `bodybind_bad_requests_total` | Counter | `kind` | Invocations rejected with a bad request |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use bodybind_core::FailureKind;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Counter of processed parameters.
pub const BINDINGS_TOTAL: &str = "bodybind_bindings_total";

/// Counter of rejected invocations.
pub const BAD_REQUESTS_TOTAL: &str = "bodybind_bad_requests_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Value of the `service` label attached to every metric.
    pub service_name: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "bodybind".to_string(),
        }
    }
}

/// What happened to one annotated parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// A value (or the missing-input default) was written to the slot.
    Bound,
    /// A failure was downgraded by `skip_convert_error`.
    Skipped,
    /// The failure aborted the invocation.
    Failed,
}

impl BindOutcome {
    /// Returns the `outcome` label value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bound => "bound",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Renders metrics in Prometheus text format.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Creates a registry around an existing handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Returns the registry of the globally installed recorder, if any.
    #[must_use]
    pub fn global() -> Option<Self> {
        METRICS_HANDLE.get().cloned().map(Self::new)
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a global recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    describe_metrics();

    Ok(())
}

/// Renders metrics from the global recorder.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn describe_metrics() {
    describe_counter!(BINDINGS_TOTAL, "Annotated handler parameters processed by outcome");
    describe_counter!(BAD_REQUESTS_TOTAL, "Invocations rejected before the handler ran, by failure kind");
}

/// Records the outcome of binding one parameter.
pub fn record_binding(outcome: BindOutcome) {
    counter!(BINDINGS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

/// Records an invocation rejected with a bad request.
pub fn record_bad_request(kind: FailureKind) {
    counter!(BAD_REQUESTS_TOTAL, "kind" => kind.as_str()).increment(1);
}
