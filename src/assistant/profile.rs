//! System profile health analysis

use serde::{Deserialize, Serialize};

/// Score given to a machine with no detected problems
pub const BASE_HEALTH_SCORE: u8 = 90;
const DISK_WARNING_PENALTY: u8 = 20;
const RECENT_ERRORS_PENALTY: u8 = 15;

pub const RISK_DISK_FAILURE: &str = "Falla de Disco Inminente";
pub const RISK_REGISTRY_CORRUPTION: &str = "Corrupción de Registro Detectada";
pub const NO_RISKS: &str = "Sin problemas evidentes en base local";
pub const LOCAL_SUMMARY: &str =
    "El sistema está operando en modo de diagnóstico local limitado por falta de conexión IA.";

/// Snapshot of a machine, as collected by the scan step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemProfile {
    pub cpu_name: String,
    pub ram_total: String,
    pub disk_health: String,
    pub os_version: String,
    pub active_processes: Vec<String>,
    pub recent_errors: Vec<String>,
}

/// Health verdict for a [`SystemProfile`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub health_score: u8,
    pub risks: Vec<String>,
    pub summary: String,
}

/// Rule-based analysis used when the AI backend is unavailable
pub fn analyze_locally(profile: &SystemProfile) -> HealthReport {
    let mut score = BASE_HEALTH_SCORE;
    let mut risks = Vec::new();

    if profile.disk_health.contains("Warning") {
        score -= DISK_WARNING_PENALTY;
        risks.push(RISK_DISK_FAILURE.to_string());
    }
    if !profile.recent_errors.is_empty() {
        score -= RECENT_ERRORS_PENALTY;
        risks.push(RISK_REGISTRY_CORRUPTION.to_string());
    }
    if risks.is_empty() {
        risks.push(NO_RISKS.to_string());
    }

    HealthReport {
        health_score: score,
        risks,
        summary: LOCAL_SUMMARY.to_string(),
    }
}
