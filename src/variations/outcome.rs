use crate::models::GeneratedImage;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Why a run ended with fewer images than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every slot was processed.
    Completed,
    /// A quota error arrived after at least one success.
    RateLimited,
    /// A run-ending error (bad key, permission denied) after at least one success.
    Failed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct VariationOutcome {
    pub images: Vec<GeneratedImage>,
    pub target: usize,
    pub attempts: u32,
    pub stop_reason: StopReason,
}

impl VariationOutcome {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.images.len() == self.target
    }

    pub fn is_partial(&self) -> bool {
        !self.images.is_empty() && self.images.len() < self.target
    }

    /// Message for the user when fewer images than requested came back.
    pub fn advisory(&self) -> Option<String> {
        if !self.is_partial() {
            return None;
        }
        let reason = match self.stop_reason {
            StopReason::RateLimited => "stopped early because of rate limiting",
            StopReason::Cancelled => "generation was cancelled",
            StopReason::Failed => "stopped after a service error",
            StopReason::Completed => "some variations could not be generated",
        };
        Some(format!(
            "Generated {} of {} variations; {}.",
            self.images.len(),
            self.target,
            reason
        ))
    }

    /// `data:` URIs in slot order.
    pub fn data_urls(&self) -> Vec<String> {
        self.images.iter().map(GeneratedImage::to_data_url).collect()
    }
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared cancellation signal. Setting it wakes every pending wait, so a run
/// stops in the middle of a sleep or a service call.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<CancelState>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the flag is set.
    pub async fn cancelled(&self) {
        loop {
            // Registered before the check so a concurrent `cancel` is not missed.
            let notified = self.0.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Drives `fut` to completion unless the flag is set first.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
