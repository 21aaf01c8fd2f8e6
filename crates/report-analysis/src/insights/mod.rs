//! Optional insight enrichment.
//!
//! [`enrich_with_timeout`] runs an [`InsightProvider`] on a detached worker
//! thread and waits at most the configured timeout for its answer.

mod provider;

pub use provider::InsightProvider;

use crate::types::{AnalysisResult, InsightAnnotation};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Ask `provider` for an annotation of `result`.
///
/// Returns `None` when the provider fails, panics, or does not answer within
/// `timeout`. A worker that outlives the timeout is left to finish on its own;
/// its answer is discarded.
pub fn enrich_with_timeout(
    provider: Arc<dyn InsightProvider>,
    result: &AnalysisResult,
    timeout: Duration,
) -> Option<InsightAnnotation> {
    let name = provider.name().to_string();
    let snapshot = result.clone();
    let (tx, rx) = mpsc::channel();

    let worker = thread::Builder::new()
        .name("insight-enrichment".to_string())
        .spawn(move || {
            let outcome = provider.generate_insights(&snapshot);
            // The receiver is gone once the caller stopped waiting
            let _ = tx.send(outcome);
        });
    if let Err(e) = worker {
        warn!(provider = %name, "Failed to start enrichment worker: {}", e);
        return None;
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(mut annotation)) => {
            if annotation.provider.is_empty() {
                annotation.provider = name;
            }
            debug!(
                provider = %annotation.provider,
                insights = annotation.insights.len(),
                recommendations = annotation.recommendations.len(),
                "Enrichment attached"
            );
            Some(annotation)
        }
        Ok(Err(e)) => {
            warn!(provider = %name, "Insight provider failed: {:#}", e);
            None
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                provider = %name,
                timeout_secs = timeout.as_secs_f64(),
                "Insight provider timed out"
            );
            None
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!(provider = %name, "Insight provider panicked");
            None
        }
    }
}
