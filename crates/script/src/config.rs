//! Page script configuration
//!
//! Every field has a default matching the SCos demo page, so a partial
//! JSON file only needs the keys it overrides.

use page_dom::DocumentConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;

/// Page script configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub session_id: String,

    /// Button acknowledged by `run_demo_action`
    pub button_id: String,

    /// Input echoed by `read_and_echo_input`
    pub input_id: String,

    /// Title restyled on click
    pub title_id: String,

    /// Selector of the container receiving dynamic sections
    pub container_selector: String,

    /// Prefix prepended by `notify`
    pub alert_prefix: String,

    /// Delay before `load_data` resolves
    pub load_delay_ms: u64,

    /// Initial page URL; relative navigation resolves against it.
    /// `None` starts at `about:blank`.
    pub page_url: Option<String>,

    pub document: DocumentConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            session_id: Uuid::now_v7().to_string(),
            button_id: "test-button".to_string(),
            input_id: "text-input".to_string(),
            title_id: "main-title".to_string(),
            container_selector: "main".to_string(),
            alert_prefix: "SCos Alert: ".to_string(),
            load_delay_ms: 1000,
            page_url: None,
            document: DocumentConfig::default(),
        }
    }
}

impl PageConfig {
    /// Parse a JSON configuration; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;

    #[test]
    fn test_defaults() {
        let config = PageConfig::default();
        assert_eq!(config.button_id, "test-button");
        assert_eq!(config.container_selector, "main");
        assert_eq!(config.load_delay(), Duration::from_secs(1));
        assert!(Uuid::parse_str(&config.session_id).is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PageConfig::from_json(r#"{ "title_id": "hero", "load_delay_ms": 50 }"#).unwrap();
        assert_eq!(config.title_id, "hero");
        assert_eq!(config.load_delay(), Duration::from_millis(50));
        assert_eq!(config.input_id, "text-input");
        assert_eq!(config.document.initial_capacity, 256);
        assert_eq!(config.page_url, None);
    }

    #[test]
    fn test_page_url_from_json() {
        let config =
            PageConfig::from_json(r#"{ "page_url": "http://localhost/scos/index.html" }"#).unwrap();
        assert_eq!(config.page_url.as_deref(), Some("http://localhost/scos/index.html"));
    }

    #[test]
    fn test_invalid_json() {
        let err = PageConfig::from_json(r#"{ "load_delay_ms": "soon" }"#).unwrap_err();
        assert!(matches!(err, PageError::Config(_)));
    }
}
