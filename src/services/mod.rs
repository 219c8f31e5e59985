//! Service layer.
//!
//! Domain flow separated from presentation: the CLI drives these services and
//! listens to their events.

pub mod extraction;

pub use extraction::{ExtractionEvent, ExtractionOutcome, ExtractionService, ServiceError};
