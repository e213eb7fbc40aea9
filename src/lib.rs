//! Commercial product photo and banner generation on the Gemini image API.
//!
//! A run builds one [`GenerationRequest`] from the user's choices and asks
//! the service for up to four variations, one slot at a time. Quota errors
//! are retried with backoff while nothing has been produced yet; once at
//! least one image exists, a quota error ends the run early and the partial
//! set is returned.

pub mod builder;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod variations;

pub use builder::{build_request, GenerationOptions};
pub use config::{Config, GeminiConfig, VariationPolicy};
pub use error::{Result, StudioError};
pub use gemini::{CredentialProvider, EnvCredentials, GeminiStudio, ImageClient, StaticCredentials};
pub use models::*;
pub use variations::{
    CancelFlag, ImageInvoker, Sleeper, StopReason, TokioSleeper, VariationOrchestrator,
    VariationOutcome,
};
