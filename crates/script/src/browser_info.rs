//! Browser info record and greeting helper

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Static description of the browser the script runs in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserInfo {
    pub name: String,
    pub version: String,
    pub features: Vec<String>,
}

impl BrowserInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>, features: Vec<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            features,
        }
    }

    /// The SCos browser record, built once per process
    pub fn scos() -> &'static BrowserInfo {
        static INFO: OnceLock<BrowserInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            BrowserInfo::new(
                "SCos Browser",
                "1.0",
                ["HTML5", "CSS3", "JavaScript ES6+", "File System Access"]
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
            )
        })
    }

    /// `"{name} v{version}\nFeatures: a, b, c"`
    pub fn display_info(&self) -> String {
        format!(
            "{} v{}\nFeatures: {}",
            self.name,
            self.version,
            self.features.join(", ")
        )
    }
}

/// Greeting shown to a named visitor; `None` greets "User"
pub fn greet_user(name: Option<&str>) -> String {
    format!("Hello, {}! Welcome to SCos Browser.", name.unwrap_or("User"))
}
