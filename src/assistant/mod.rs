//! Assistant module - AI backend access with local fallback

pub mod advice;
pub mod client;
pub mod mobile;
pub mod profile;
pub mod schema;
pub mod service;

pub use advice::{InstallManual, ManualStep, RecoveryAdvice};
pub use client::{CommandClient, CompletionClient, OfflineClient, UpstreamError};
pub use mobile::MobileDiagnosis;
pub use profile::{HealthReport, SystemProfile};
pub use schema::{ResponseSchema, ResponseValidator};
pub use service::{Answer, Assistant, Source};
