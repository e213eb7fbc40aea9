//! Slot-by-slot variation generation with quota-aware retries.

pub mod orchestrator;
pub mod outcome;
pub mod traits;

pub use orchestrator::VariationOrchestrator;
pub use outcome::{CancelFlag, StopReason, VariationOutcome};
pub use traits::{ImageInvoker, Sleeper, TokioSleeper};
