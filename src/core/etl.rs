use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: String,
    pub summary: RunSummary,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting enrichment run");
        if self.monitor.is_enabled() {
            tracing::info!("🔍 System monitoring enabled");
        }

        // Extract
        let rows = self.pipeline.extract().await?;
        tracing::info!("Read {} rows", rows.len());
        self.monitor.log_stage("Extract");

        // Transform
        let report = self.pipeline.transform(rows).await?;
        let summary = report.summary.clone();
        tracing::info!(
            "Enriched {} of {} rows ({} unresolved, {} requests)",
            summary.enriched,
            summary.rows_read,
            summary.unresolved,
            summary.requests_used
        );
        self.monitor.log_stage("Transform");

        // Load
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!(
            "Wrote {} features to {}",
            report.entries.len(),
            output_path
        );
        self.monitor.log_stage("Load");

        if summary.limit_reached {
            tracing::warn!(
                "API request limit reached ({} requests, max {}). Remaining rows have no location data.",
                summary.requests_used,
                summary.request_limit
            );
        }
        self.monitor.log_final();

        Ok(RunOutcome {
            output_path,
            summary,
        })
    }
}
