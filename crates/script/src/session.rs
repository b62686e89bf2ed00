//! Page Session
//!
//! The high-level API: owns the host, the handler and the listener
//! registry for one page. Reload and navigation consume the session,
//! since nothing of the script survives them.

use page_dom::NodeId;

use crate::browser_info::BrowserInfo;
use crate::config::PageConfig;
use crate::error::Result;
use crate::events::{EventBus, PageEvent};
use crate::handler::{Outcome, PageHandler};
use crate::host::Host;
use crate::listeners::{DomEventType, ListenerRegistry};
use crate::loader;

/// Readiness of the page, as the script observes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
}

/// One page and the script running in it
pub struct PageSession<H: Host> {
    pub config: PageConfig,
    pub event_bus: EventBus,

    host: H,
    handler: PageHandler,
    listeners: ListenerRegistry,
    browser_info: BrowserInfo,
    ready_state: ReadyState,
}

impl<H: Host> PageSession<H> {
    pub fn new(mut host: H, config: PageConfig) -> Self {
        let event_bus = EventBus::new();
        host.attach_events(event_bus.clone());

        tracing::debug!("[PageSession {}] created", config.session_id);

        Self {
            handler: PageHandler::new(config.clone()),
            config,
            event_bus,
            host,
            listeners: ListenerRegistry::new(),
            browser_info: BrowserInfo::scos().clone(),
            ready_state: ReadyState::Loading,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Give the host back, ending the session
    pub fn into_host(self) -> H {
        self.host
    }

    pub fn browser_info(&self) -> &BrowserInfo {
        &self.browser_info
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Deliver `DOMContentLoaded`; only the first delivery wires anything
    pub fn dom_content_loaded(&mut self) -> Result<()> {
        if self.ready_state != ReadyState::Loading {
            tracing::debug!(
                "[PageSession {}] DOMContentLoaded already handled",
                self.config.session_id
            );
            return Ok(());
        }

        self.ready_state = ReadyState::Interactive;
        self.event_bus.publish(PageEvent::DomContentLoaded);
        self.handler
            .on_dom_content_loaded(&mut self.host, &mut self.listeners)?;
        Ok(())
    }

    /// Click a node: run its listeners in registration order
    ///
    /// Returns how many listeners ran.
    pub fn click(&mut self, node: NodeId) -> Result<usize> {
        let actions = self.listeners.get(node, DomEventType::Click).to_vec();
        for action in &actions {
            self.handler.dispatch(&mut self.host, action)?;
        }
        Ok(actions.len())
    }

    /// Click the element with `id`; a missing element runs nothing
    pub fn click_element(&mut self, id: &str) -> Result<usize> {
        match self.host.document().get_element_by_id(id) {
            Some(node) => self.click(node),
            None => Ok(0),
        }
    }

    pub fn run_demo_action(&mut self) -> Result<Outcome> {
        self.handler.run_demo_action(&mut self.host)
    }

    pub fn read_and_echo_input(&mut self) -> Result<Option<String>> {
        self.handler.read_and_echo_input(&mut self.host)
    }

    pub fn restyle_title(&mut self) -> Result<Outcome> {
        self.handler.restyle_title(&mut self.host)
    }

    pub fn append_dynamic_section(&mut self) -> Result<Outcome> {
        self.handler.append_dynamic_section(&mut self.host)
    }

    pub fn notify(&mut self, message: &str) {
        self.handler.notify(&mut self.host, message)
    }

    pub fn toggle_visibility(&mut self, id: &str) -> Result<Outcome> {
        self.handler.toggle_visibility(&mut self.host, id)
    }

    /// Reload the page. Terminal: the host is handed back.
    pub fn reload(mut self) -> H {
        self.handler.reload(&mut self.host);
        self.host
    }

    /// Leave for `url`. Terminal: the host is handed back.
    pub fn navigate(mut self, url: &str) -> Result<H> {
        self.handler.navigate(&mut self.host, url)?;
        Ok(self.host)
    }

    /// Script-load lifecycle: wait for the data, then log it
    pub async fn run_script_load(&mut self) -> Result<String> {
        let result = loader::load_data(&self.host, self.config.load_delay()).await;
        loader::report_load(&mut self.host, &result);

        match &result {
            Ok(value) => self.event_bus.publish(PageEvent::DataLoaded {
                result: value.clone(),
            }),
            Err(e) => self.event_bus.publish(PageEvent::LoadFailed {
                error: e.to_string(),
            }),
        }

        result
    }
}
