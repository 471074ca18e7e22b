use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;
use crate::db::types::Subject;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn essay_graded() {
    metrics::counter!("essays_graded_total").increment(1);
}

pub(crate) fn quiz_attempt_recorded() {
    metrics::counter!("quiz_attempts_total").increment(1);
}

pub(crate) fn progress_updated(subject: Subject) {
    metrics::counter!("progress_updates_total", "subject" => subject.as_str()).increment(1);
}

pub(crate) fn request_rate_limited(policy: &'static str) {
    metrics::counter!("rate_limited_requests_total", "policy" => policy).increment(1);
}
