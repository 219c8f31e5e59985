//! End-to-end extraction flow.
//!
//! fingerprint -> history lookup -> extraction -> history record. A history
//! hit is reported to the caller but never skips extraction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::models::{ContentFingerprint, DocumentResult, HistoryRecord, HistorySummary, RawDocument};
use crate::ocr::{DocumentExtractor, ExtractionError};
use crate::repository::{HistoryRepository, RepositoryError};
use crate::utils::{check_declared_format, FormatCheck};

/// Errors that end a request without a result.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Extraction timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Events emitted while a document is processed.
#[derive(Debug, Clone)]
pub enum ExtractionEvent {
    /// The same content was processed before.
    PreviouslySeen(HistoryRecord),
    /// A page finished.
    PageCompleted { completed: u32, total: u32 },
}

/// A finished request.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub result: DocumentResult,
    pub fingerprint: ContentFingerprint,
    /// History row found before this run, if any.
    pub previously_seen: Option<HistoryRecord>,
    pub duration: Duration,
    /// Set when the result was produced but could not be written to history.
    pub history_error: Option<RepositoryError>,
}

/// Runs documents through the extractor and keeps the history store current.
pub struct ExtractionService {
    extractor: Arc<DocumentExtractor>,
    history: Option<Arc<HistoryRepository>>,
    timeout: Option<Duration>,
}

impl ExtractionService {
    /// Create a service without history or timeout.
    pub fn new(extractor: Arc<DocumentExtractor>) -> Self {
        Self {
            extractor,
            history: None,
            timeout: None,
        }
    }

    pub fn with_history(mut self, history: Arc<HistoryRepository>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn extractor(&self) -> &DocumentExtractor {
        &self.extractor
    }

    /// Process a document on a blocking worker thread.
    ///
    /// With a timeout configured, a document that takes longer is abandoned
    /// as a whole and its partial pages are discarded.
    pub async fn process(
        &self,
        document: RawDocument,
        config: ExtractionConfig,
        event_tx: Option<mpsc::Sender<ExtractionEvent>>,
    ) -> Result<ExtractionOutcome, ServiceError> {
        let fingerprint = self.prepare(&document);
        let previously_seen = self.lookup(&fingerprint);
        if let (Some(record), Some(tx)) = (&previously_seen, &event_tx) {
            let _ = tx.send(ExtractionEvent::PreviouslySeen(record.clone())).await;
        }

        let document = Arc::new(document);
        let start = Instant::now();

        let handle = {
            let extractor = self.extractor.clone();
            let document = document.clone();
            let config = config.clone();
            tokio::task::spawn_blocking(move || {
                let mut progress = |completed: u32, total: u32| {
                    if let Some(tx) = &event_tx {
                        // Full or closed channel drops the event; pages never wait on the listener
                        let _ = tx.try_send(ExtractionEvent::PageCompleted { completed, total });
                    }
                };
                extractor.extract_with_progress(&document, &config, &mut progress)
            })
        };

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("{} timed out after {:?}", document.filename(), limit);
                    self.record(
                        &fingerprint,
                        &HistorySummary::failed(&document, &config.language, start.elapsed()),
                    );
                    return Err(ServiceError::TimedOut(limit));
                }
            },
            None => handle.await,
        };

        let extracted = joined.map_err(|e| ServiceError::Task(e.to_string()))?;
        self.finish(&document, &config, fingerprint, previously_seen, extracted, start.elapsed())
    }

    /// Process a document on the calling thread. No timeout applies.
    pub fn process_blocking(
        &self,
        document: &RawDocument,
        config: &ExtractionConfig,
        progress: &mut dyn FnMut(u32, u32),
    ) -> Result<ExtractionOutcome, ServiceError> {
        let fingerprint = self.prepare(document);
        let previously_seen = self.lookup(&fingerprint);

        let start = Instant::now();
        let extracted = self
            .extractor
            .extract_with_progress(document, config, progress);
        self.finish(document, config, fingerprint, previously_seen, extracted, start.elapsed())
    }

    fn prepare(&self, document: &RawDocument) -> ContentFingerprint {
        let fingerprint = document.fingerprint();
        debug!(
            "Processing {} ({} bytes, {})",
            document.filename(),
            document.byte_size(),
            fingerprint.short()
        );

        if let FormatCheck::Mismatch { detected } =
            check_declared_format(document.format(), document.content())
        {
            warn!(
                "{} declared as {} but content looks like {}",
                document.filename(),
                document.format(),
                detected
            );
        }
        fingerprint
    }

    fn lookup(&self, fingerprint: &ContentFingerprint) -> Option<HistoryRecord> {
        let history = self.history.as_ref()?;
        match history.lookup(fingerprint) {
            Ok(record) => record,
            Err(e) => {
                warn!("History lookup failed for {}: {}", fingerprint.short(), e);
                None
            }
        }
    }

    fn record(
        &self,
        fingerprint: &ContentFingerprint,
        summary: &HistorySummary,
    ) -> Option<RepositoryError> {
        let history = self.history.as_ref()?;
        match history.record(fingerprint, summary) {
            Ok(()) => None,
            Err(e) => {
                warn!("Failed to record history for {}: {}", summary.filename, e);
                Some(e)
            }
        }
    }

    fn finish(
        &self,
        document: &RawDocument,
        config: &ExtractionConfig,
        fingerprint: ContentFingerprint,
        previously_seen: Option<HistoryRecord>,
        extracted: Result<DocumentResult, ExtractionError>,
        duration: Duration,
    ) -> Result<ExtractionOutcome, ServiceError> {
        match extracted {
            Ok(result) => {
                let summary =
                    HistorySummary::from_result(document, &result, &config.language, duration);
                let history_error = self.record(&fingerprint, &summary);

                info!(
                    "Processed {} in {:?} ({} characters)",
                    document.filename(),
                    duration,
                    summary.character_count
                );

                Ok(ExtractionOutcome {
                    result,
                    fingerprint,
                    previously_seen,
                    duration,
                    history_error,
                })
            }
            Err(e) => {
                warn!("Extraction of {} failed: {}", document.filename(), e);
                self.record(
                    &fingerprint,
                    &HistorySummary::failed(document, &config.language, duration),
                );
                Err(e.into())
            }
        }
    }
}
