use crate::{
    error::Result,
    models::{GeneratedImage, GenerationRequest},
};
use async_trait::async_trait;
use std::time::Duration;

/// Makes exactly one generation call. `Ok(None)` is a valid empty answer.
#[async_trait]
pub trait ImageInvoker: Send + Sync {
    async fn invoke(&self, request: &GenerationRequest) -> Result<Option<GeneratedImage>>;
}

#[async_trait]
impl<'a, T: ImageInvoker + ?Sized> ImageInvoker for &'a T {
    async fn invoke(&self, request: &GenerationRequest) -> Result<Option<GeneratedImage>> {
        (**self).invoke(request).await
    }
}

/// Waits between attempts. Swapped out in tests so no real time passes.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
