//! Installation guides, data recovery advice and security scripts
//!
//! Local answers here are fixed: they do not depend on the question.

use serde::{Deserialize, Serialize};

/// Step-by-step guide for installing an image or tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallManual {
    pub title: String,
    pub steps: Vec<ManualStep>,
    #[serde(default)]
    pub technical_tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualStep {
    pub step: String,
    pub details: String,
}

/// How likely lost files are to come back, and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryAdvice {
    pub chance: String,
    pub tool: String,
    pub steps: Vec<String>,
}

/// Generic USB install guide
pub fn generic_install_manual() -> InstallManual {
    InstallManual {
        title: "Guía de Instalación Genérica".to_string(),
        steps: vec![
            ManualStep {
                step: "Preparar USB".to_string(),
                details: "Usar Rufus con esquema GPT/UEFI.".to_string(),
            },
            ManualStep {
                step: "Configurar BIOS".to_string(),
                details: "Desactivar Secure Boot y seleccionar el USB como prioridad.".to_string(),
            },
        ],
        technical_tips: vec!["Usar puertos USB 3.0 para mayor velocidad".to_string()],
    }
}

/// Conservative recovery advice for any file type
pub fn generic_recovery_advice() -> RecoveryAdvice {
    RecoveryAdvice {
        chance: "Media (40-60%)".to_string(),
        tool: "PhotoRec / Recuva / R-Studio".to_string(),
        steps: vec![
            "No guardar nuevos archivos en el disco afectado".to_string(),
            "Escanear en modo profundo (Deep Scan)".to_string(),
            "Recuperar archivos en una unidad distinta".to_string(),
        ],
    }
}

const SECURITY_SCRIPT_LINES: [&str; 7] = [
    "@echo off",
    "echo OmniFix Security Fix (Modo Offline)",
    "echo Realizando mantenimiento de emergencia...",
    "sfc /scannow",
    "dism /online /cleanup-image /restorehealth",
    "ipconfig /flushdns",
    "pause",
];

/// Emergency maintenance script (CRLF line endings)
pub fn emergency_security_script() -> String {
    let mut script = SECURITY_SCRIPT_LINES.join("\r\n");
    script.push_str("\r\n");
    script
}
