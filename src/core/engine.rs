use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::ResourceMonitor;

/// 依序執行 extract → transform → load
pub struct PredictionEngine<P: Pipeline> {
    pipeline: P,
    monitor: ResourceMonitor,
}

impl<P: Pipeline> PredictionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: ResourceMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting batch prediction");

        let rows = self.pipeline.extract().await?;
        let malformed = rows.iter().filter(|r| r.malformed.is_some()).count();
        tracing::info!("📥 Extracted {} requests ({} malformed)", rows.len(), malformed);
        self.monitor.record("extract");

        let report = self.pipeline.transform(rows).await?;
        tracing::info!(
            "🔄 Predicted {}/{} rows (no data: {}, invalid: {}, failed: {})",
            report.summary.predicted,
            report.summary.total,
            report.summary.no_data,
            report.summary.invalid,
            report.summary.failed
        );
        self.monitor.record("transform");

        let output_path = self.pipeline.load(report).await?;
        tracing::info!("📁 Output saved to: {}", output_path);
        self.monitor.record("load");

        self.monitor.log_summary();
        Ok(output_path)
    }
}
