// THEORY:
// The `batch` module runs many independent photo analyses concurrently. The core
// is synchronous and CPU-bound, so each analysis goes to tokio's blocking pool;
// a semaphore sized to the worker count keeps at most that many in flight.
//
// Because every analysis is a pure function of (image, config) and the shared
// `ProcessingContext` is immutable, workers need no coordination beyond the
// permit. Results come back in input order regardless of completion order.

use crate::error::GlareError;
use crate::pipeline::{GlareAnalysis, GlareConfig, ProcessingContext, RasterImage};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

pub struct BatchAnalyzer {
    context: Arc<ProcessingContext>,
    config: Arc<GlareConfig>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl BatchAnalyzer {
    /// One worker per logical CPU.
    pub fn new(config: GlareConfig) -> Self {
        Self::with_workers(config, num_cpus::get())
    }

    pub fn with_workers(config: GlareConfig, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            context: Arc::new(ProcessingContext::cpu()),
            config: Arc::new(config),
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyzes one image on the blocking pool.
    pub async fn analyze(&self, image: RasterImage) -> Result<GlareAnalysis, GlareError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| GlareError::Analysis(format!("worker pool closed: {e}")))?;

        let context = Arc::clone(&self.context);
        let config = Arc::clone(&self.config);
        let analysis = tokio::task::spawn_blocking(move || context.analyze(&image, &config)).await?;
        Ok(analysis)
    }

    /// Analyzes every image, at most `workers` at a time, preserving input order.
    pub async fn analyze_all(
        &self,
        images: Vec<RasterImage>,
    ) -> Vec<Result<GlareAnalysis, GlareError>> {
        let count = images.len();
        let results = join_all(images.into_iter().map(|image| self.analyze(image))).await;
        debug!(images = count, workers = self.workers, "Batch analysis finished");
        results
    }
}
