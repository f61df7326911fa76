use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Initializes metrics by installing a global metrics recorder.
///
/// Also starts listening on an http endpoint at `0.0.0.0:9000/metrics` for
/// scrapers to collect metrics from. If the passed run id is not none, it is
/// set as a global label named "run" so that samples from concurrent runs can
/// be told apart.
pub fn init_metrics(run_id: Option<String>) -> Result<(), BuildError> {
    let mut builder = PrometheusBuilder::new();

    if let Some(run_id) = run_id {
        builder = builder.add_global_label("run", run_id);
    }

    builder.install()?;

    Ok(())
}
