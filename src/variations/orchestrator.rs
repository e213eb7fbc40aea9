use crate::{
    config::VariationPolicy,
    error::{Result, StudioError},
    logger,
    models::{GeneratedImage, GenerationRequest},
    variations::{CancelFlag, ImageInvoker, Sleeper, StopReason, VariationOutcome},
};
use std::time::Duration;

/// State of the slot currently being worked on.
#[derive(Debug, Clone, Copy)]
enum SlotState {
    Attempting,
    Succeeded,
    /// Retry after the given delay.
    FailedRetryable(Duration),
    FailedFatal,
    /// Quota hit with images already in hand: end the whole run.
    StopRun,
    /// Run-ending failure, kept in `VariationRun::failure`.
    Aborted,
}

/// Working state of one run. Lives only for the duration of the call.
#[derive(Debug)]
struct VariationRun {
    target: usize,
    images: Vec<GeneratedImage>,
    slot: usize,
    attempt: u32,
    backoff: Duration,
    total_attempts: u32,
    failure: Option<StudioError>,
}

impl VariationRun {
    fn new(target: usize) -> Self {
        Self {
            target,
            images: Vec::with_capacity(target),
            slot: 0,
            attempt: 0,
            backoff: Duration::ZERO,
            total_attempts: 0,
            failure: None,
        }
    }

    fn begin_slot(&mut self, slot: usize, initial_backoff: Duration) {
        self.slot = slot;
        self.attempt = 0;
        self.backoff = initial_backoff;
    }

    fn finish(self, stop_reason: StopReason) -> Result<VariationOutcome> {
        if self.images.is_empty() {
            return Err(match (stop_reason, self.failure) {
                (StopReason::Cancelled, _) => StudioError::Cancelled,
                (_, Some(failure)) => failure,
                _ => StudioError::RunExhausted,
            });
        }
        Ok(VariationOutcome {
            images: self.images,
            target: self.target,
            attempts: self.total_attempts,
            stop_reason,
        })
    }
}

/// Produces up to `policy.target_count` images for one request, one slot at
/// a time, retrying quota failures with exponential backoff.
pub struct VariationOrchestrator<I, S> {
    invoker: I,
    sleeper: S,
    policy: VariationPolicy,
}

impl<I: ImageInvoker, S: Sleeper> VariationOrchestrator<I, S> {
    pub fn new(invoker: I, sleeper: S, policy: VariationPolicy) -> Self {
        Self {
            invoker,
            sleeper,
            policy,
        }
    }

    pub async fn generate_variations(&self, request: &GenerationRequest) -> Result<VariationOutcome> {
        self.generate_with_cancel(request, &CancelFlag::new()).await
    }

    /// Like [`Self::generate_variations`], but stops as soon as `cancel` is
    /// set, even mid-sleep or mid-call, keeping whatever was produced.
    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancelFlag,
    ) -> Result<VariationOutcome> {
        let _timer = logger::timer("variation run");
        let target = self.policy.target_count;
        let mut run = VariationRun::new(target);

        log::info!(
            "Generating {} {} variation(s) with style '{}'",
            target,
            request.mode(),
            request.style().id()
        );

        for slot in 0..target {
            run.begin_slot(slot, self.policy.initial_backoff);
            let mut state = SlotState::Attempting;

            loop {
                if cancel.is_cancelled() {
                    log::warn!("Run cancelled at slot {}", slot + 1);
                    return run.finish(StopReason::Cancelled);
                }

                match state {
                    SlotState::Attempting => {
                        let next = cancel
                            .run_until_cancelled(self.attempt(request, &mut run))
                            .await;
                        match next {
                            Some(next) => state = next,
                            None => {
                                log::warn!("Run cancelled during slot {}", slot + 1);
                                return run.finish(StopReason::Cancelled);
                            }
                        }
                    }
                    SlotState::FailedRetryable(delay) => {
                        log::warn!("Quota hit. Retrying in {}s...", delay.as_secs());
                        if cancel
                            .run_until_cancelled(self.sleeper.sleep(delay))
                            .await
                            .is_none()
                        {
                            log::warn!("Run cancelled during backoff");
                            return run.finish(StopReason::Cancelled);
                        }
                        state = SlotState::Attempting;
                    }
                    SlotState::Succeeded | SlotState::FailedFatal => break,
                    SlotState::StopRun => {
                        log::info!(
                            "Quota hit (429). Returning {} partial result(s)",
                            run.images.len()
                        );
                        return run.finish(StopReason::RateLimited);
                    }
                    SlotState::Aborted => {
                        log::error!(
                            "Stopping run with {} result(s) after an unrecoverable error",
                            run.images.len()
                        );
                        return run.finish(StopReason::Failed);
                    }
                }
            }

            if matches!(state, SlotState::Succeeded)
                && slot + 1 < target
                && cancel
                    .run_until_cancelled(self.sleeper.sleep(self.policy.pacing))
                    .await
                    .is_none()
            {
                log::warn!("Run cancelled while pacing");
                return run.finish(StopReason::Cancelled);
            }
        }

        if run.images.is_empty() {
            log::error!("No variations produced after {} attempt(s)", run.total_attempts);
        }
        run.finish(StopReason::Completed)
    }

    async fn attempt(&self, request: &GenerationRequest, run: &mut VariationRun) -> SlotState {
        run.total_attempts += 1;
        let label = format!("Variation {} attempt {}", run.slot + 1, run.attempt + 1);

        match self.invoker.invoke(request).await {
            Ok(Some(image)) => {
                log::info!("{} succeeded", label);
                run.images.push(image);
                SlotState::Succeeded
            }
            Ok(None) => {
                run.attempt += 1;
                if run.attempt < self.policy.max_attempts {
                    log::warn!("{} returned no image", label);
                    SlotState::Attempting
                } else {
                    log::warn!("{} returned no image, giving up on this slot", label);
                    SlotState::FailedFatal
                }
            }
            Err(err) if err.is_quota() => {
                log::warn!("{} failed: {}", label, err);
                if !run.images.is_empty() {
                    return SlotState::StopRun;
                }
                run.attempt += 1;
                if run.attempt < self.policy.max_attempts {
                    let delay = run.backoff;
                    run.backoff = run
                        .backoff
                        .checked_mul(self.policy.backoff_multiplier)
                        .unwrap_or(Duration::MAX);
                    SlotState::FailedRetryable(delay)
                } else {
                    SlotState::FailedFatal
                }
            }
            Err(err) if err.is_run_terminal() => {
                log::error!("{} failed: {}", label, err);
                run.failure = Some(err);
                SlotState::Aborted
            }
            Err(err) => {
                log::warn!("{} failed, skipping this slot: {}", label, err);
                SlotState::FailedFatal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::{build_request, GenerationOptions},
        models::{AppMode, AspectRatio, ImagePayload, ProductCategory, StyleSelection},
        variations::TokioSleeper,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Image,
        Empty,
        Quota,
        Fatal,
        NoKey,
        Denied,
        Hang,
    }

    /// Replays a script of outcomes; falls back to `rest` once it runs out.
    struct ScriptedInvoker {
        script: Mutex<VecDeque<Step>>,
        rest: Step,
        calls: Mutex<u8>,
        cancel_after: Option<(u8, CancelFlag)>,
    }

    impl ScriptedInvoker {
        fn new(script: &[Step], rest: Step) -> Self {
            Self {
                script: Mutex::new(script.iter().copied().collect()),
                rest,
                calls: Mutex::new(0),
                cancel_after: None,
            }
        }

        fn calls(&self) -> u8 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ImageInvoker for ScriptedInvoker {
        async fn invoke(&self, _request: &GenerationRequest) -> Result<Option<GeneratedImage>> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if let Some((after, flag)) = &self.cancel_after {
                if call >= *after {
                    flag.cancel();
                }
            }
            let step = self.script.lock().unwrap().pop_front().unwrap_or(self.rest);
            match step {
                // The call number tags each image so ordering can be checked.
                Step::Image => Ok(Some(GeneratedImage {
                    data: vec![call],
                    mime_type: "image/png".into(),
                })),
                Step::Empty => Ok(None),
                Step::Quota => Err(StudioError::Service {
                    status: 429,
                    code: Some("RESOURCE_EXHAUSTED".into()),
                    message: "Resource has been exhausted".into(),
                }),
                Step::Fatal => Err(StudioError::Service {
                    status: 400,
                    code: Some("INVALID_ARGUMENT".into()),
                    message: "Bad request".into(),
                }),
                Step::NoKey => Err(StudioError::ConfigError("GEMINI_API_KEY not set".into())),
                Step::Denied => Err(StudioError::Service {
                    status: 403,
                    code: Some("PERMISSION_DENIED".into()),
                    message: "The caller does not have permission".into(),
                }),
                Step::Hang => std::future::pending().await,
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSleeper(Arc<Mutex<Vec<Duration>>>);

    impl RecordingSleeper {
        fn secs(&self) -> Vec<u64> {
            self.0.lock().unwrap().iter().map(Duration::as_secs).collect()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    fn request() -> GenerationRequest {
        build_request(GenerationOptions {
            description: "Chocolate cookies".into(),
            category: ProductCategory::Snacks,
            style: StyleSelection::find(AppMode::Photo, "flat_prop").unwrap(),
            aspect_ratio: AspectRatio::Square,
            images: vec![ImagePayload::new(vec![1, 2, 3], "image/png").unwrap()],
        })
    }

    async fn run(
        invoker: &ScriptedInvoker,
        policy: VariationPolicy,
    ) -> (Result<VariationOutcome>, RecordingSleeper) {
        let sleeper = RecordingSleeper::default();
        let orchestrator = VariationOrchestrator::new(invoker, sleeper.clone(), policy);
        let result = orchestrator.generate_variations(&request()).await;
        (result, sleeper)
    }

    fn tags(outcome: &VariationOutcome) -> Vec<u8> {
        outcome.images.iter().map(|image| image.data[0]).collect()
    }

    #[tokio::test]
    async fn test_all_slots_succeed_with_pacing() {
        let invoker = ScriptedInvoker::new(&[], Step::Image);
        let (result, sleeper) = run(&invoker, VariationPolicy::default()).await;

        let outcome = result.unwrap();
        assert!(outcome.is_complete());
        assert_eq!(tags(&outcome), vec![1, 2, 3, 4]);
        assert_eq!(outcome.attempts, 4);
        assert_eq!(outcome.stop_reason, StopReason::Completed);
        assert_eq!(invoker.calls(), 4);
        assert_eq!(sleeper.secs(), vec![8, 8, 8]);
    }

    #[tokio::test]
    async fn test_quota_without_results_backs_off_then_exhausts() {
        let invoker = ScriptedInvoker::new(&[], Step::Quota);
        let (result, sleeper) = run(&invoker, VariationPolicy::default()).await;

        assert!(matches!(result, Err(StudioError::RunExhausted)));
        assert_eq!(invoker.calls(), 12);
        assert_eq!(sleeper.secs(), vec![20, 40, 20, 40, 20, 40, 20, 40]);
    }

    #[tokio::test]
    async fn test_quota_after_success_stops_run() {
        let invoker = ScriptedInvoker::new(&[Step::Image], Step::Quota);
        let (result, sleeper) = run(&invoker, VariationPolicy::default()).await;

        let outcome = result.unwrap();
        assert_eq!(tags(&outcome), vec![1]);
        assert_eq!(outcome.stop_reason, StopReason::RateLimited);
        assert!(outcome.advisory().unwrap().contains("1 of 4"));
        assert_eq!(invoker.calls(), 2);
        assert_eq!(sleeper.secs(), vec![8]);
    }

    #[tokio::test]
    async fn test_fatal_failure_skips_only_that_slot() {
        let invoker = ScriptedInvoker::new(
            &[Step::Image, Step::Image, Step::Fatal, Step::Image],
            Step::Fatal,
        );
        let (result, sleeper) = run(&invoker, VariationPolicy::default()).await;

        let outcome = result.unwrap();
        assert_eq!(tags(&outcome), vec![1, 2, 4]);
        assert!(outcome.is_partial());
        assert_eq!(invoker.calls(), 4);
        assert_eq!(sleeper.secs(), vec![8, 8]);
    }

    #[tokio::test]
    async fn test_fatal_everywhere_tries_each_slot_once() {
        let invoker = ScriptedInvoker::new(&[], Step::Fatal);
        let (result, sleeper) = run(&invoker, VariationPolicy::default()).await;

        assert!(matches!(result, Err(StudioError::RunExhausted)));
        assert_eq!(invoker.calls(), 4);
        assert!(sleeper.secs().is_empty());
    }

    #[tokio::test]
    async fn test_quota_recovers_within_slot() {
        let invoker = ScriptedInvoker::new(&[Step::Quota, Step::Quota], Step::Image);
        let (result, sleeper) = run(&invoker, VariationPolicy::default()).await;

        let outcome = result.unwrap();
        assert_eq!(tags(&outcome), vec![3, 4, 5, 6]);
        assert_eq!(outcome.attempts, 6);
        assert_eq!(sleeper.secs(), vec![20, 40, 8, 8, 8]);
    }

    #[tokio::test]
    async fn test_empty_responses_exhaust_slot_without_sleeping() {
        let invoker = ScriptedInvoker::new(&[Step::Empty, Step::Empty, Step::Empty], Step::Image);
        let (result, sleeper) = run(&invoker, VariationPolicy::default()).await;

        let outcome = result.unwrap();
        assert_eq!(tags(&outcome), vec![4, 5, 6]);
        assert_eq!(invoker.calls(), 6);
        assert_eq!(sleeper.secs(), vec![8, 8]);
    }

    #[tokio::test]
    async fn test_policy_controls_counts_and_delays() {
        let invoker = ScriptedInvoker::new(&[Step::Quota, Step::Quota, Step::Quota], Step::Image);
        let policy = VariationPolicy::new()
            .with_target_count(2)
            .with_max_attempts(4)
            .with_backoff(Duration::from_secs(1), 3)
            .with_pacing(Duration::from_secs(2));
        let (result, sleeper) = run(&invoker, policy).await;

        let outcome = result.unwrap();
        assert_eq!(outcome.target, 2);
        assert_eq!(tags(&outcome), vec![4, 5]);
        assert_eq!(sleeper.secs(), vec![1, 3, 9, 2]);
    }

    #[tokio::test]
    async fn test_cancel_keeps_accumulated_images() {
        let flag = CancelFlag::new();
        let mut invoker = ScriptedInvoker::new(&[], Step::Image);
        invoker.cancel_after = Some((2, flag.clone()));
        let sleeper = RecordingSleeper::default();
        let orchestrator =
            VariationOrchestrator::new(&invoker, sleeper.clone(), VariationPolicy::default());

        let outcome = orchestrator
            .generate_with_cancel(&request(), &flag)
            .await
            .unwrap();
        assert_eq!(tags(&outcome), vec![1, 2]);
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(invoker.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let flag = CancelFlag::new();
        flag.cancel();
        let invoker = ScriptedInvoker::new(&[], Step::Image);
        let orchestrator = VariationOrchestrator::new(
            &invoker,
            RecordingSleeper::default(),
            VariationPolicy::default(),
        );

        let result = orchestrator.generate_with_cancel(&request(), &flag).await;
        assert!(matches!(result, Err(StudioError::Cancelled)));
        assert_eq!(invoker.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_ends_run_with_config_error() {
        let invoker = ScriptedInvoker::new(&[], Step::NoKey);
        let (result, sleeper) = run(&invoker, VariationPolicy::default()).await;

        let err = result.unwrap_err();
        assert!(matches!(err, StudioError::ConfigError(_)));
        assert!(!err.user_message().contains("busy"));
        assert_eq!(invoker.calls(), 1);
        assert!(sleeper.secs().is_empty());
    }

    #[tokio::test]
    async fn test_permission_denied_keeps_earlier_images() {
        let invoker = ScriptedInvoker::new(&[Step::Image], Step::Denied);
        let (result, _) = run(&invoker, VariationPolicy::default()).await;

        let outcome = result.unwrap();
        assert_eq!(tags(&outcome), vec![1]);
        assert_eq!(outcome.stop_reason, StopReason::Failed);
        assert_eq!(invoker.calls(), 2);

        let invoker = ScriptedInvoker::new(&[], Step::Denied);
        let (result, _) = run(&invoker, VariationPolicy::default()).await;
        let err = result.unwrap_err();
        assert!(err.is_permission_denied());
        assert!(err.user_message().contains("403"));
    }

    #[tokio::test]
    async fn test_backoff_saturates_instead_of_overflowing() {
        let invoker = ScriptedInvoker::new(&[], Step::Quota);
        let policy = VariationPolicy::new()
            .with_target_count(1)
            .with_max_attempts(3)
            .with_backoff(Duration::MAX / 2, 4);
        let (result, sleeper) = run(&invoker, policy).await;

        assert!(matches!(result, Err(StudioError::RunExhausted)));
        let sleeps = sleeper.0.lock().unwrap().clone();
        assert_eq!(sleeps, vec![Duration::MAX / 2, Duration::MAX]);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_backoff_sleep() {
        let flag = CancelFlag::new();
        let invoker = ScriptedInvoker::new(&[], Step::Quota);
        let policy = VariationPolicy::new().with_backoff(Duration::from_secs(30), 2);
        let orchestrator = VariationOrchestrator::new(&invoker, TokioSleeper, policy);

        let trigger = flag.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = orchestrator.generate_with_cancel(&request(), &flag).await;
        assert!(matches!(result, Err(StudioError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(invoker.calls(), 1);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_call() {
        let flag = CancelFlag::new();
        let invoker = ScriptedInvoker::new(&[Step::Image], Step::Hang);
        let policy = VariationPolicy::new().with_pacing(Duration::ZERO);
        let orchestrator = VariationOrchestrator::new(&invoker, TokioSleeper, policy);

        let trigger = flag.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            orchestrator.generate_with_cancel(&request(), &flag),
        )
        .await
        .expect("run should stop once cancelled")
        .unwrap();
        assert_eq!(tags(&outcome), vec![1]);
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(invoker.calls(), 2);
    }
}
