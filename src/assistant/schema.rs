//! Response validation at the AI boundary
//!
//! Upstream replies are untrusted text. Each one is parsed as JSON, checked
//! against the JSON Schema for the expected shape, and only then deserialized
//! into a typed value.

use jsonschema::{validator_for, Validator as JsonValidator};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::assistant::client::UpstreamError;

#[derive(RustEmbed)]
#[folder = "schemas/"]
struct SchemaAssets;

/// Shapes the AI backend is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseSchema {
    Diagnostic,
    RepairPlan,
    HealthReport,
    MobileDiagnosis,
    Library,
    InstallManual,
    RecoveryAdvice,
}

impl ResponseSchema {
    pub fn all() -> &'static [ResponseSchema] {
        &[
            ResponseSchema::Diagnostic,
            ResponseSchema::RepairPlan,
            ResponseSchema::HealthReport,
            ResponseSchema::MobileDiagnosis,
            ResponseSchema::Library,
            ResponseSchema::InstallManual,
            ResponseSchema::RecoveryAdvice,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            ResponseSchema::Diagnostic => "diagnostic",
            ResponseSchema::RepairPlan => "repair_plan",
            ResponseSchema::HealthReport => "health_report",
            ResponseSchema::MobileDiagnosis => "mobile_diagnosis",
            ResponseSchema::Library => "library",
            ResponseSchema::InstallManual => "install_manual",
            ResponseSchema::RecoveryAdvice => "recovery_advice",
        }
    }

    fn file_name(self) -> String {
        format!("{}.schema.json", self.name())
    }
}

/// Compiled response schemas
pub struct ResponseValidator {
    compiled: HashMap<ResponseSchema, JsonValidator>,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseValidator {
    /// Compile every embedded schema
    ///
    /// A schema that fails to load is logged and left out; replies for that
    /// shape are then rejected.
    pub fn new() -> Self {
        let mut compiled = HashMap::new();

        for schema in ResponseSchema::all() {
            let Some(file) = SchemaAssets::get(&schema.file_name()) else {
                tracing::error!(schema = schema.name(), "embedded schema missing");
                continue;
            };
            let parsed = serde_json::from_slice::<JsonValue>(&file.data)
                .map_err(|e| e.to_string())
                .and_then(|json| validator_for(&json).map_err(|e| e.to_string()));
            match parsed {
                Ok(validator) => {
                    compiled.insert(*schema, validator);
                }
                Err(e) => tracing::error!(schema = schema.name(), error = %e, "invalid schema"),
            }
        }

        Self { compiled }
    }

    /// Check a JSON value against a schema, collecting every violation
    pub fn check(&self, schema: ResponseSchema, value: &JsonValue) -> Result<(), UpstreamError> {
        let Some(validator) = self.compiled.get(&schema) else {
            return Err(UpstreamError::SchemaViolation {
                schema: schema.name(),
                violations: vec!["schema unavailable".to_string()],
            });
        };

        let violations: Vec<String> = validator
            .iter_errors(value)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(UpstreamError::SchemaViolation {
                schema: schema.name(),
                violations,
            })
        }
    }

    /// Parse, validate and deserialize a raw reply
    pub fn parse<T: DeserializeOwned>(
        &self,
        schema: ResponseSchema,
        text: &str,
    ) -> Result<T, UpstreamError> {
        let body = strip_code_fence(text);
        let value: JsonValue = serde_json::from_str(body)
            .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;
        self.check(schema, &value)?;
        serde_json::from_value(value).map_err(|e| UpstreamError::MalformedResponse(e.to_string()))
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```), if present
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    match body.find('\n') {
        Some(idx) => body[idx + 1..].trim(),
        None => body.trim(),
    }
}
