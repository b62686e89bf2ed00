//! Page Interaction Handler
//!
//! Each operation is a guarded lookup followed by one mutation or one
//! notification. A missing element is not an error: the operation does
//! nothing visible and reports `Outcome::TargetMissing` to its caller.

use page_dom::NodeId;

use crate::config::PageConfig;
use crate::error::Result;
use crate::host::{ConsoleLevel, Host};
use crate::listeners::{Action, DomEventType, ListenerRegistry};

pub const DEMO_ALERT: &str =
    "Hello from SCos Browser!\n\nThis demonstrates JavaScript execution in the SCos web browser.";
pub const BUTTON_CLICKED_TEXT: &str = "Clicked!";
pub const BUTTON_CLICKED_COLOR: &str = "#ff0000";
pub const EMPTY_INPUT_ALERT: &str = "Please enter some text first!";
pub const TITLE_ACTIVE_TEXT: &str = "SCos Browser - JavaScript Active!";
pub const TITLE_ACTIVE_COLOR: &str = "#ff0080";
pub const TITLE_TOOLTIP: &str = "Click to change style";
pub const DYNAMIC_SECTION_MARKUP: &str =
    "<h3>Dynamic Content</h3><p>This content was added by JavaScript!</p>";
pub const SCRIPT_LOADED_MESSAGE: &str = "SCos Browser JavaScript loaded successfully!";

/// Result of a lookup-then-mutate operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The node that was mutated or created
    Applied(NodeId),
    TargetMissing,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

/// Stateless handler; every call looks its targets up afresh
#[derive(Debug, Clone)]
pub struct PageHandler {
    config: PageConfig,
}

impl PageHandler {
    pub fn new(config: PageConfig) -> Self {
        Self { config }
    }

    /// Show the demo dialog, then mark the test button as clicked
    pub fn run_demo_action<H: Host + ?Sized>(&self, host: &mut H) -> Result<Outcome> {
        host.alert(DEMO_ALERT);

        let Some(button) = lookup(host, &self.config.button_id) else {
            return Ok(Outcome::TargetMissing);
        };
        let doc = host.document_mut();
        doc.set_text_content(button, BUTTON_CLICKED_TEXT)?;
        doc.set_style(button, "background-color", BUTTON_CLICKED_COLOR)?;
        Ok(Outcome::Applied(button))
    }

    /// Echo the text input's value, or ask for one
    ///
    /// Returns the echoed value; `None` when the fallback dialog was shown.
    pub fn read_and_echo_input<H: Host + ?Sized>(&self, host: &mut H) -> Result<Option<String>> {
        let value = match lookup(host, &self.config.input_id) {
            Some(input) => host.document().value(input)?,
            None => String::new(),
        };

        if value.is_empty() {
            host.alert(EMPTY_INPUT_ALERT);
            return Ok(None);
        }

        host.alert(&format!("You entered: {}", value));
        Ok(Some(value))
    }

    /// Recolor and retitle the page heading. Idempotent.
    pub fn restyle_title<H: Host + ?Sized>(&self, host: &mut H) -> Result<Outcome> {
        let Some(title) = lookup(host, &self.config.title_id) else {
            return Ok(Outcome::TargetMissing);
        };
        let doc = host.document_mut();
        doc.set_style(title, "color", TITLE_ACTIVE_COLOR)?;
        doc.set_text_content(title, TITLE_ACTIVE_TEXT)?;
        Ok(Outcome::Applied(title))
    }

    /// Append a new styled section to the container. Each call adds one.
    pub fn append_dynamic_section<H: Host + ?Sized>(&self, host: &mut H) -> Result<Outcome> {
        let Some(container) = host
            .document()
            .query_selector(&self.config.container_selector)?
        else {
            tracing::debug!(
                "container '{}' not found, skipping",
                self.config.container_selector
            );
            return Ok(Outcome::TargetMissing);
        };

        let doc = host.document_mut();
        let section = doc.create_element("section");
        doc.set_inner_html(section, DYNAMIC_SECTION_MARKUP)?;
        doc.set_style(section, "background-color", "#008080")?;
        doc.set_style(section, "padding", "15px")?;
        doc.set_style(section, "margin-top", "20px")?;
        doc.append_child(container, section)?;
        Ok(Outcome::Applied(section))
    }

    /// Show `message` with the configured prefix
    pub fn notify<H: Host + ?Sized>(&self, host: &mut H, message: &str) {
        host.alert(&format!("{}{}", self.config.alert_prefix, message));
    }

    /// Hide a shown element, show a hidden one
    ///
    /// Only inline `display: none` counts as hidden; unset counts as shown.
    pub fn toggle_visibility<H: Host + ?Sized>(&self, host: &mut H, id: &str) -> Result<Outcome> {
        let Some(element) = lookup(host, id) else {
            return Ok(Outcome::TargetMissing);
        };
        let doc = host.document_mut();
        let next = if doc.style(element, "display")? == Some("none") {
            "block"
        } else {
            "none"
        };
        doc.set_style(element, "display", next)?;
        Ok(Outcome::Applied(element))
    }

    pub fn reload<H: Host + ?Sized>(&self, host: &mut H) {
        host.reload();
    }

    pub fn navigate<H: Host + ?Sized>(&self, host: &mut H, url: &str) -> Result<()> {
        host.navigate(url)
    }

    /// `DOMContentLoaded` wiring: make the title clickable
    pub fn on_dom_content_loaded<H: Host + ?Sized>(
        &self,
        host: &mut H,
        listeners: &mut ListenerRegistry,
    ) -> Result<Outcome> {
        host.console(ConsoleLevel::Log, SCRIPT_LOADED_MESSAGE);

        let Some(title) = lookup(host, &self.config.title_id) else {
            return Ok(Outcome::TargetMissing);
        };
        listeners.add(title, DomEventType::Click, Action::RestyleTitle);

        let doc = host.document_mut();
        doc.set_style(title, "cursor", "pointer")?;
        doc.set_attribute(title, "title", TITLE_TOOLTIP)?;
        Ok(Outcome::Applied(title))
    }

    /// Run one listener action
    pub fn dispatch<H: Host + ?Sized>(&self, host: &mut H, action: &Action) -> Result<()> {
        tracing::debug!("dispatching {:?}", action);
        match action {
            Action::RunDemoAction => log_miss("run_demo_action", self.run_demo_action(host)?),
            Action::ReadAndEchoInput => {
                self.read_and_echo_input(host)?;
            }
            Action::RestyleTitle => log_miss("restyle_title", self.restyle_title(host)?),
            Action::AppendDynamicSection => log_miss(
                "append_dynamic_section",
                self.append_dynamic_section(host)?,
            ),
            Action::Notify(message) => self.notify(host, message),
            Action::ToggleVisibility(id) => {
                log_miss("toggle_visibility", self.toggle_visibility(host, id)?)
            }
        }
        Ok(())
    }
}

fn lookup<H: Host + ?Sized>(host: &H, id: &str) -> Option<NodeId> {
    let found = host.document().get_element_by_id(id);
    if found.is_none() {
        tracing::debug!("element #{} not found, skipping", id);
    }
    found
}

fn log_miss(operation: &str, outcome: Outcome) {
    if outcome == Outcome::TargetMissing {
        tracing::trace!("{} had no target", operation);
    }
}
