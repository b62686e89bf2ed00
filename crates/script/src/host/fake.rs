//! Fake Host - in-memory page environment
//!
//! Records every dialog, console line and navigation request instead of
//! showing or performing them. Dialogs are dismissed immediately. The
//! timer is tokio's, so tests on a paused clock stay deterministic.

use async_trait::async_trait;
use page_dom::Document;
use std::time::Duration;
use url::Url;

use super::{ConsoleLevel, Host};
use crate::config::PageConfig;
use crate::error::{PageError, Result};
use crate::events::{EventBus, PageEvent};

/// A dialog as the user saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRecord {
    pub message: String,
    /// Document revision at the moment the dialog was shown
    pub revision: u64,
}

/// A navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Reload { url: String },
    Navigate { url: String },
}

pub struct FakeHost {
    document: Document,
    /// `None` is `about:blank`
    location: Option<Url>,
    dialogs: Vec<DialogRecord>,
    console: Vec<(ConsoleLevel, String)>,
    navigations: Vec<Navigation>,
    events: Option<EventBus>,
}

impl FakeHost {
    /// Host showing `document` at `about:blank`
    pub fn new(document: Document) -> Self {
        Self {
            document,
            location: None,
            dialogs: Vec::new(),
            console: Vec::new(),
            navigations: Vec::new(),
            events: None,
        }
    }

    /// Parse `markup` into the host's document
    pub fn from_html(markup: &str) -> Result<Self> {
        Ok(Self::new(Document::from_html(markup)?))
    }

    /// Parse `markup` with the document settings and initial URL of `config`
    pub fn from_config(markup: &str, config: &PageConfig) -> Result<Self> {
        let document = Document::from_html_with_config(markup, config.document.clone())?;
        let host = Self::new(document);
        match &config.page_url {
            Some(url) => host.at(url),
            None => Ok(host),
        }
    }

    /// Set the current location
    pub fn at(mut self, location: &str) -> Result<Self> {
        self.location = Some(parse_url(location, None)?);
        Ok(self)
    }

    pub fn location(&self) -> &str {
        self.location.as_ref().map(Url::as_str).unwrap_or(BLANK)
    }

    pub fn dialogs(&self) -> &[DialogRecord] {
        &self.dialogs
    }

    /// Dialog messages only, in display order
    pub fn dialog_messages(&self) -> Vec<&str> {
        self.dialogs.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn console_lines(&self) -> &[(ConsoleLevel, String)] {
        &self.console
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.navigations
    }

    pub fn reload_count(&self) -> usize {
        self.navigations
            .iter()
            .filter(|n| matches!(n, Navigation::Reload { .. }))
            .count()
    }

    fn publish(&self, event: PageEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

const BLANK: &str = "about:blank";

fn parse_url(url: &str, base: Option<&Url>) -> Result<Url> {
    let parsed = match base {
        Some(base) => base.join(url),
        None => Url::parse(url),
    };
    parsed.map_err(|source| PageError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

#[async_trait]
impl Host for FakeHost {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn alert(&mut self, message: &str) {
        tracing::debug!("[FakeHost] alert: {}", message);
        self.dialogs.push(DialogRecord {
            message: message.to_string(),
            revision: self.document.revision(),
        });
        self.publish(PageEvent::DialogShown {
            message: message.to_string(),
        });
    }

    fn reload(&mut self) {
        let url = self.location().to_string();
        tracing::info!("[FakeHost] reload requested: {}", url);
        self.navigations.push(Navigation::Reload { url: url.clone() });
        self.publish(PageEvent::ReloadRequested { url });
    }

    fn navigate(&mut self, url: &str) -> Result<()> {
        let target = parse_url(url, self.location.as_ref())?;

        tracing::info!("[FakeHost] navigation requested: {}", target);
        self.navigations.push(Navigation::Navigate {
            url: target.to_string(),
        });
        self.publish(PageEvent::NavigationRequested {
            url: target.to_string(),
        });
        self.location = Some(target);
        Ok(())
    }

    fn console(&mut self, level: ConsoleLevel, message: &str) {
        match level {
            ConsoleLevel::Log | ConsoleLevel::Info => tracing::info!("[console.{}] {}", level, message),
            ConsoleLevel::Warn => tracing::warn!("[console.{}] {}", level, message),
            ConsoleLevel::Error => tracing::error!("[console.{}] {}", level, message),
        }
        self.console.push((level, message.to_string()));
        self.publish(PageEvent::ConsoleMessage {
            level,
            message: message.to_string(),
        });
    }

    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    fn attach_events(&mut self, bus: EventBus) {
        self.events = Some(bus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogs_capture_revision() {
        let mut host = FakeHost::from_html("<p id='x'>a</p>").unwrap();
        host.alert("first");
        let node = host.document().get_element_by_id("x").unwrap();
        host.document_mut().set_text_content(node, "b").unwrap();
        host.alert("second");

        let dialogs = host.dialogs();
        assert_eq!(host.dialog_messages(), vec!["first", "second"]);
        assert!(dialogs[0].revision < dialogs[1].revision);
    }

    #[test]
    fn test_navigate_resolves_relative_urls() {
        let mut host = FakeHost::new(Document::new())
            .at("http://localhost/scos/index.html")
            .unwrap();

        host.navigate("about.html").unwrap();
        assert_eq!(host.location(), "http://localhost/scos/about.html");

        host.reload();
        assert_eq!(
            host.navigations(),
            &[
                Navigation::Navigate {
                    url: "http://localhost/scos/about.html".to_string()
                },
                Navigation::Reload {
                    url: "http://localhost/scos/about.html".to_string()
                },
            ]
        );
        assert_eq!(host.reload_count(), 1);
    }

    #[test]
    fn test_from_config_applies_page_url() {
        let config =
            PageConfig::from_json(r#"{ "page_url": "http://localhost/scos/index.html" }"#).unwrap();
        let mut host = FakeHost::from_config("<main></main>", &config).unwrap();
        assert_eq!(host.location(), "http://localhost/scos/index.html");

        host.navigate("help.html").unwrap();
        assert_eq!(host.location(), "http://localhost/scos/help.html");

        let blank = FakeHost::from_config("<main></main>", &PageConfig::default()).unwrap();
        assert_eq!(blank.location(), "about:blank");
    }

    #[test]
    fn test_from_config_rejects_bad_page_url() {
        let config = PageConfig::from_json(r#"{ "page_url": "not a url" }"#).unwrap();
        let err = FakeHost::from_config("<main></main>", &config).err().unwrap();
        assert!(matches!(err, PageError::InvalidUrl { .. }));
    }

    #[test]
    fn test_relative_navigation_from_blank_fails() {
        let mut host = FakeHost::new(Document::new());
        let err = host.navigate("next.html").unwrap_err();
        assert!(matches!(err, PageError::InvalidUrl { .. }));
        assert!(host.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_events_are_published_once_attached() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let mut host = FakeHost::new(Document::new());

        host.console(ConsoleLevel::Log, "before");
        host.attach_events(bus);
        host.console(ConsoleLevel::Warn, "after");

        assert_eq!(
            rx.recv().await.unwrap(),
            PageEvent::ConsoleMessage {
                level: ConsoleLevel::Warn,
                message: "after".to_string()
            }
        );
        assert_eq!(host.console_lines().len(), 2);
    }
}
