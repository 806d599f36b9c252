//! Knowledge entry type - one known issue with its remediation

use serde::{Deserialize, Serialize};

/// Issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Malware,
    Hardware,
    System,
    Network,
    Mobile,
    Storage,
    Drivers,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Malware,
            Category::Hardware,
            Category::System,
            Category::Network,
            Category::Mobile,
            Category::Storage,
            Category::Drivers,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Malware => write!(f, "Malware"),
            Category::Hardware => write!(f, "Hardware"),
            Category::System => write!(f, "System"),
            Category::Network => write!(f, "Network"),
            Category::Mobile => write!(f, "Mobile"),
            Category::Storage => write!(f, "Storage"),
            Category::Drivers => write!(f, "Drivers"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Danger level of an issue
///
/// Variants are declared in ascending order so the derived `Ord` matches
/// the ranking used for repair tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DangerLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl DangerLevel {
    /// Ordinal rank: Critical 3, High 2, Medium 1, Low 0
    pub fn rank(self) -> u8 {
        match self {
            DangerLevel::Low => 0,
            DangerLevel::Medium => 1,
            DangerLevel::High => 2,
            DangerLevel::Critical => 3,
        }
    }
}

impl std::fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DangerLevel::Low => write!(f, "Low"),
            DangerLevel::Medium => write!(f, "Medium"),
            DangerLevel::High => write!(f, "High"),
            DangerLevel::Critical => write!(f, "Critical"),
        }
    }
}

impl std::str::FromStr for DangerLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(DangerLevel::Low),
            "medium" => Ok(DangerLevel::Medium),
            "high" => Ok(DangerLevel::High),
            "critical" => Ok(DangerLevel::Critical),
            _ => Err(format!("Unknown danger level: {}", s)),
        }
    }
}

/// A catalog entry describing a known issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Unique identifier (e.g. "st-03")
    pub id: String,

    /// Short human-readable title
    pub name: String,

    pub category: Category,

    /// How the issue usually shows up; descriptive only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptom_examples: Vec<String>,

    /// Explanation shown as the diagnostic summary
    pub description: String,

    pub danger_level: DangerLevel,

    /// Manual remediation instructions, in order
    pub remediation_steps: Vec<String>,

    /// Command lines; the first one is the primary repair command
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terminal_commands: Vec<String>,

    /// Keywords used for matching
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Command used when an entry carries no terminal commands
pub const DEFAULT_COMMAND: &str = "sfc /scannow";

impl KnowledgeEntry {
    /// The primary repair command, or the default system-file check
    pub fn primary_command(&self) -> &str {
        self.terminal_commands
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_COMMAND)
    }

    /// Lower-cased concatenation of name, description, tags and category
    pub fn haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.description,
            self.tags.join(" "),
            self.category
        )
        .to_lowercase()
    }
}
