//! Assistant service - one upstream attempt, then local fallback
//!
//! Every operation asks the AI backend once. Any failure (no backend, no
//! credentials, process error, malformed or off-schema reply) is logged and
//! answered from local data instead. Callers always get a value of the same
//! shape; [`Source`] only tells them where it came from.

use serde::Serialize;

use crate::assistant::advice::{self, InstallManual, RecoveryAdvice};
use crate::assistant::client::{CompletionClient, UpstreamError};
use crate::assistant::mobile::{self, MobileDiagnosis};
use crate::assistant::profile::{self, HealthReport, SystemProfile};
use crate::assistant::schema::{strip_code_fence, ResponseSchema, ResponseValidator};
use crate::knowledge::{
    build_repair_plan, match_diagnosis, Catalog, DiagnosticResult, Library, LibraryItem, RepairTask,
};

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Upstream,
    Local,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Upstream => write!(f, "ai"),
            Source::Local => write!(f, "local"),
        }
    }
}

/// A value together with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Answer<T> {
    fn upstream(value: T) -> Self {
        Self {
            value,
            source: Source::Upstream,
        }
    }

    fn local(value: T) -> Self {
        Self {
            value,
            source: Source::Local,
        }
    }
}

/// Front door for every diagnostic operation
pub struct Assistant<'a, C: CompletionClient> {
    client: C,
    catalog: &'a Catalog,
    validator: ResponseValidator,
}

impl<'a, C: CompletionClient> Assistant<'a, C> {
    pub fn new(client: C, catalog: &'a Catalog) -> Self {
        Self {
            client,
            catalog,
            validator: ResponseValidator::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    /// Single upstream attempt for one schema
    fn ask<T: serde::de::DeserializeOwned>(
        &self,
        schema: ResponseSchema,
        prompt: &str,
    ) -> Result<T, UpstreamError> {
        let reply = self.client.complete(prompt)?;
        self.validator.parse(schema, &reply)
    }

    /// Use the upstream answer if there is one, else compute the local one
    fn answer_or<T>(
        &self,
        operation: &str,
        upstream: Result<T, UpstreamError>,
        local: impl FnOnce() -> T,
    ) -> Answer<T> {
        match upstream {
            Ok(value) => Answer::upstream(value),
            Err(UpstreamError::NotConfigured) => {
                tracing::debug!(operation, "no AI backend configured, using local knowledge");
                Answer::local(local())
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "AI backend unavailable, using local knowledge");
                Answer::local(local())
            }
        }
    }

    /// Diagnose a free-text problem description
    pub fn diagnose(&self, symptoms: &str) -> Answer<DiagnosticResult> {
        let prompt = diagnostic_prompt(symptoms);
        let upstream = self.ask(ResponseSchema::Diagnostic, &prompt);
        self.answer_or("diagnose", upstream, || match_diagnosis(self.catalog, symptoms))
    }

    /// Build a repair plan for risk labels
    pub fn repair_plan<S: AsRef<str>>(&self, risks: &[S]) -> Answer<Vec<RepairTask>> {
        let prompt = repair_plan_prompt(risks);
        let upstream = self.ask(ResponseSchema::RepairPlan, &prompt);
        self.answer_or("repair_plan", upstream, || build_repair_plan(self.catalog, risks))
    }

    /// Judge the health of a machine
    pub fn analyze_profile(&self, profile: &SystemProfile) -> Answer<HealthReport> {
        let upstream = serde_json::to_string(profile)
            .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))
            .and_then(|json| self.ask(ResponseSchema::HealthReport, &health_prompt(&json)));
        self.answer_or("analyze_profile", upstream, || profile::analyze_locally(profile))
    }

    /// Board-level diagnosis for a mobile device
    pub fn mobile_diagnosis(&self, model: &str, symptoms: &str) -> Answer<MobileDiagnosis> {
        let prompt = mobile_prompt(model, symptoms);
        let upstream = self.ask(ResponseSchema::MobileDiagnosis, &prompt);
        self.answer_or("mobile_diagnosis", upstream, || {
            mobile::diagnose_locally(self.catalog, model, symptoms)
        })
    }

    /// ISO library: `defaults` plus any new items suggested upstream
    pub fn iso_library(&self, defaults: Library) -> Answer<Library> {
        match self.ask::<Vec<LibraryItem>>(ResponseSchema::Library, ISO_LIBRARY_PROMPT) {
            Ok(suggested) => {
                let mut library = defaults;
                let added = library.merge(suggested);
                tracing::debug!(added, "merged suggested library items");
                Answer::upstream(library)
            }
            Err(e) => self.answer_or("iso_library", Err(e), || defaults),
        }
    }

    /// Mobile firmware list; `fallback` when the backend has none
    pub fn firmware_library(&self, fallback: Library) -> Answer<Library> {
        let upstream = self
            .ask::<Vec<LibraryItem>>(ResponseSchema::Library, FIRMWARE_LIBRARY_PROMPT)
            .and_then(|items| {
                Library::new(items).map_err(|e| UpstreamError::MalformedResponse(e.to_string()))
            });
        self.answer_or("firmware_library", upstream, || fallback)
    }

    /// Installation guide for an image or tool
    pub fn installation_manual(&self, name: &str) -> Answer<InstallManual> {
        let upstream = self.ask(ResponseSchema::InstallManual, &manual_prompt(name));
        self.answer_or("installation_manual", upstream, advice::generic_install_manual)
    }

    /// Data recovery advice for a file type and loss scenario
    pub fn recovery_advice(&self, file_type: &str, scenario: &str) -> Answer<RecoveryAdvice> {
        let upstream = self.ask(
            ResponseSchema::RecoveryAdvice,
            &recovery_prompt(file_type, scenario),
        );
        self.answer_or("recovery_advice", upstream, advice::generic_recovery_advice)
    }

    /// Batch script addressing a security issue
    ///
    /// The reply is free text rather than JSON, so only a surrounding code
    /// fence is removed.
    pub fn security_script(&self, module: &str, issue: &str) -> Answer<String> {
        let upstream = self
            .client
            .complete(&security_prompt(module, issue))
            .and_then(|reply| match strip_code_fence(&reply) {
                "" => Err(UpstreamError::MalformedResponse("empty script".to_string())),
                body => Ok(body.to_string()),
            });
        self.answer_or("security_script", upstream, advice::emergency_security_script)
    }
}

const ISO_LIBRARY_PROMPT: &str = "ISOs técnicas JSON array {id, name, version, size, type, status, description, downloadUrl}.";
const FIRMWARE_LIBRARY_PROMPT: &str = "Firmwares móviles JSON array {id, name, version, size, type, status, description}.";

pub fn diagnostic_prompt(symptoms: &str) -> String {
    format!(
        "Diagnóstico: {}. Responde JSON: {{ summary, steps[], recommendedTools[], severity, difficulty }}.",
        symptoms
    )
}

pub fn repair_plan_prompt<S: AsRef<str>>(risks: &[S]) -> String {
    let joined: Vec<&str> = risks.iter().map(AsRef::as_ref).collect();
    format!(
        "Plan reparación CMD para: {}. JSON array {{id, title, command, description}}.",
        joined.join(", ")
    )
}

pub fn health_prompt(profile_json: &str) -> String {
    format!(
        "Analiza JSON: {}. Responde JSON: {{ healthScore, risks[], summary }}.",
        profile_json
    )
}

pub fn manual_prompt(name: &str) -> String {
    format!(
        "Guía {}. Responde JSON: {{ title, steps[{{ step, details }}], technicalTips[] }}.",
        name
    )
}

pub fn recovery_prompt(file_type: &str, scenario: &str) -> String {
    format!(
        "Recuperación {} ({}). Responde JSON: {{ chance, tool, steps[] }}.",
        file_type, scenario
    )
}

pub fn security_prompt(module: &str, issue: &str) -> String {
    format!("Script .bat para {}: {}.", module, issue)
}

pub fn mobile_prompt(model: &str, symptoms: &str) -> String {
    format!(
        "Dispositivo: {}. Síntomas: {}. Responde JSON: {{ likelyIssue, schematicFocus, difficulty, requiredTools[], repairSteps[], microSolderingRequired }}.",
        model, symptoms
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::client::OfflineClient;
    use std::cell::RefCell;

    /// Replays a canned reply and records prompts
    struct CannedClient {
        reply: Result<String, ()>,
        prompts: RefCell<Vec<String>>,
    }

    impl CannedClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for CannedClient {
        fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|_| UpstreamError::CommandFailed {
                    code: Some(2),
                    stderr: "quota exceeded".to_string(),
                })
        }
    }

    fn seed() -> Catalog {
        Catalog::embedded().unwrap()
    }

    #[test]
    fn test_offline_diagnose_matches_local() {
        let catalog = seed();
        let assistant = Assistant::new(OfflineClient, &catalog);

        let answer = assistant.diagnose("pantallazo azul bsod");
        assert_eq!(answer.source, Source::Local);
        assert_eq!(answer.value, match_diagnosis(&catalog, "pantallazo azul bsod"));
    }

    #[test]
    fn test_upstream_diagnose_used_when_valid() {
        let catalog = seed();
        let client = CannedClient::replying(
            r#"{"summary":"RAM defectuosa","steps":["MemTest86"],"recommendedTools":["MemTest86"],"severity":"High","difficulty":"Media"}"#,
        );
        let assistant = Assistant::new(client, &catalog);

        let answer = assistant.diagnose("reinicios aleatorios");
        assert_eq!(answer.source, Source::Upstream);
        assert_eq!(answer.value.summary, "RAM defectuosa");
    }

    #[test]
    fn test_single_attempt_then_fallback() {
        let catalog = seed();
        let client = CannedClient::failing();
        let assistant = Assistant::new(client, &catalog);

        let answer = assistant.diagnose("disco raw");
        assert_eq!(answer.source, Source::Local);
        assert_eq!(assistant.client.prompts.borrow().len(), 1);
        assert!(assistant.client.prompts.borrow()[0].starts_with("Diagnóstico: disco raw."));
    }

    #[test]
    fn test_off_schema_reply_falls_back() {
        let catalog = seed();
        let assistant = Assistant::new(CannedClient::replying(r#"{"summary":"x"}"#), &catalog);

        let answer = assistant.diagnose("zzzz");
        assert_eq!(answer.source, Source::Local);
        assert!(answer.value.is_fallback());
    }

    #[test]
    fn test_repair_plan_fallback_and_prompt() {
        let catalog = seed();
        let assistant = Assistant::new(CannedClient::replying("not json"), &catalog);

        let answer = assistant.repair_plan(&["disco sin letra", "bsod"]);
        assert_eq!(answer.source, Source::Local);
        assert_eq!(answer.value, build_repair_plan(&catalog, &["disco sin letra", "bsod"]));
        assert_eq!(
            assistant.client.prompts.borrow()[0],
            "Plan reparación CMD para: disco sin letra, bsod. JSON array {id, title, command, description}."
        );
    }

    #[test]
    fn test_repair_plan_upstream() {
        let catalog = seed();
        let assistant = Assistant::new(
            CannedClient::replying(
                r#"[{"id":"ai-1","title":"Flush DNS","command":"ipconfig /flushdns","description":"DNS"}]"#,
            ),
            &catalog,
        );

        let answer = assistant.repair_plan(&["dns"]);
        assert_eq!(answer.source, Source::Upstream);
        assert_eq!(answer.value[0].id, "ai-1");
    }

    #[test]
    fn test_analyze_profile_fallback() {
        let catalog = seed();
        let assistant = Assistant::new(OfflineClient, &catalog);
        let profile = SystemProfile {
            disk_health: "Warning".to_string(),
            ..Default::default()
        };

        let answer = assistant.analyze_profile(&profile);
        assert_eq!(answer.source, Source::Local);
        assert_eq!(answer.value.health_score, 70);
    }

    #[test]
    fn test_mobile_upstream() {
        let catalog = seed();
        let reply = r#"{"likelyIssue":"IC de carga","schematicFocus":"Tristar","difficulty":"Alta","requiredTools":["Estación de calor"],"repairSteps":["Reemplazar IC"],"microSolderingRequired":true}"#;
        let assistant = Assistant::new(CannedClient::replying(reply), &catalog);

        let answer = assistant.mobile_diagnosis("iPhone 8", "no carga");
        assert_eq!(answer.source, Source::Upstream);
        assert_eq!(answer.value.schematic_focus, "Tristar");
        assert!(assistant.client.prompts.borrow()[0].starts_with("Dispositivo: iPhone 8. Síntomas: no carga."));
    }

    fn library_item(id: &str, name: &str) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            name: name.to_string(),
            version: "1".to_string(),
            size: "1 MB".to_string(),
            kind: "Utility".to_string(),
            status: "Stable".to_string(),
            description: String::new(),
            download_url: None,
        }
    }

    #[test]
    fn test_iso_library_merges_suggestions() {
        let catalog = seed();
        let reply = r#"[
            {"id":"ai-ventoy","name":"Ventoy","version":"1.0.99","size":"15 MB","type":"Utility","status":"Stable","description":"USB"},
            {"id":"ai-7z","name":"7-ZIP","version":"24","size":"1 MB","type":"Software","status":"Stable","description":"dup"}
        ]"#;
        let assistant = Assistant::new(CannedClient::replying(reply), &catalog);
        let defaults = Library::new(vec![library_item("sw-7zip", "7-Zip")]).unwrap();

        let answer = assistant.iso_library(defaults);
        assert_eq!(answer.source, Source::Upstream);
        let ids: Vec<&str> = answer.value.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["sw-7zip", "ai-ventoy"]);
    }

    #[test]
    fn test_iso_library_offline_is_defaults() {
        let catalog = seed();
        let assistant = Assistant::new(OfflineClient, &catalog);
        let defaults = Library::new(vec![library_item("iso-hiren", "Hiren's BootCD PE")]).unwrap();

        let answer = assistant.iso_library(defaults.clone());
        assert_eq!(answer.source, Source::Local);
        assert_eq!(answer.value, defaults);
    }

    #[test]
    fn test_firmware_library_rejects_duplicate_ids() {
        let catalog = seed();
        let reply = r#"[
            {"id":"x","name":"A","version":"1","size":"1","type":"ROM","status":"S","description":""},
            {"id":"x","name":"B","version":"1","size":"1","type":"ROM","status":"S","description":""}
        ]"#;
        let assistant = Assistant::new(CannedClient::replying(reply), &catalog);
        let fallback = Library::new(vec![library_item("f-1", "LineageOS 21")]).unwrap();

        let answer = assistant.firmware_library(fallback);
        assert_eq!(answer.source, Source::Local);
        assert_eq!(answer.value.items()[0].id, "f-1");
    }

    #[test]
    fn test_manual_and_recovery_fallbacks() {
        let catalog = seed();
        let assistant = Assistant::new(CannedClient::failing(), &catalog);

        let manual = assistant.installation_manual("Medicat USB Full");
        assert_eq!(manual.source, Source::Local);
        assert_eq!(manual.value, advice::generic_install_manual());

        let advice_answer = assistant.recovery_advice("fotos", "formateo accidental");
        assert_eq!(advice_answer.value, advice::generic_recovery_advice());
        assert_eq!(
            assistant.client.prompts.borrow()[1],
            "Recuperación fotos (formateo accidental). Responde JSON: { chance, tool, steps[] }."
        );
    }

    #[test]
    fn test_security_script_upstream_text() {
        let catalog = seed();
        let assistant = Assistant::new(
            CannedClient::replying("```bat\n@echo off\nnetsh advfirewall reset\n```"),
            &catalog,
        );

        let answer = assistant.security_script("Firewall", "reglas corruptas");
        assert_eq!(answer.source, Source::Upstream);
        assert_eq!(answer.value, "@echo off\nnetsh advfirewall reset");
        assert_eq!(assistant.client.prompts.borrow()[0], "Script .bat para Firewall: reglas corruptas.");
    }

    #[test]
    fn test_security_script_fallback() {
        let catalog = seed();
        let assistant = Assistant::new(OfflineClient, &catalog);
        let answer = assistant.security_script("Malware", "popups");
        assert_eq!(answer.source, Source::Local);
        assert_eq!(answer.value, advice::emergency_security_script());
    }
}
