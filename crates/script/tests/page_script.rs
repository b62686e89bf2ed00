//! End-to-end behavior of the page script against a parsed demo page

use page_script::handler::{DEMO_ALERT, EMPTY_INPUT_ALERT, TITLE_ACTIVE_TEXT};
use page_script::host::Navigation;
use page_script::{
    BrowserInfo, ConsoleLevel, FakeHost, Host, Outcome, PageConfig, PageEvent, PageSession,
    ReadyState,
};
use std::time::Duration;

const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>SCos Browser Test Page</title></head>
  <body>
    <header>
      <h1 id="main-title">SCos Browser</h1>
    </header>
    <main>
      <button id="test-button" onclick="testFunction()">Run</button>
      <input id="text-input" type="text">
      <div id="info-panel">Browser details</div>
    </main>
    <script>
      for (var i = 0; i<features.length; i++) { console.log("<li>" + features[i]); }
    </script>
  </body>
</html>"#;

fn session() -> PageSession<FakeHost> {
    let config =
        PageConfig::from_json(r#"{ "page_url": "http://localhost/scos/index.html" }"#).unwrap();
    let host = FakeHost::from_config(DEMO_PAGE, &config).unwrap();
    PageSession::new(host, config)
}

fn main_id(session: &PageSession<FakeHost>) -> u32 {
    session
        .host()
        .document()
        .query_selector("main")
        .unwrap()
        .unwrap()
}

#[test]
fn demo_action_shows_dialog_then_marks_button() {
    let mut session = session();
    let button = session
        .host()
        .document()
        .get_element_by_id("test-button")
        .unwrap();
    let revision_before = session.host().document().revision();

    assert_eq!(session.run_demo_action().unwrap(), Outcome::Applied(button));

    let host = session.host();
    assert_eq!(host.document().text_content(button).unwrap(), "Clicked!");
    assert_eq!(host.dialog_messages(), vec![DEMO_ALERT]);
    // dialog was shown before any mutation happened
    assert_eq!(host.dialogs()[0].revision, revision_before);
    assert!(host.document().revision() > revision_before);
}

#[test]
fn missing_elements_leave_document_untouched() {
    let host = FakeHost::from_html("<p>empty page</p>").unwrap();
    let mut session = PageSession::new(host, PageConfig::default());
    let revision = session.host().document().revision();

    assert_eq!(session.restyle_title().unwrap(), Outcome::TargetMissing);
    assert_eq!(session.append_dynamic_section().unwrap(), Outcome::TargetMissing);
    assert_eq!(session.toggle_visibility("info-panel").unwrap(), Outcome::TargetMissing);

    assert_eq!(session.host().document().revision(), revision);
    assert!(session.host().dialogs().is_empty());

    // the input echo is the one operation that always speaks up
    assert_eq!(session.read_and_echo_input().unwrap(), None);
    assert_eq!(session.host().dialog_messages(), vec![EMPTY_INPUT_ALERT]);
    assert_eq!(session.host().document().revision(), revision);
}

#[test]
fn echo_reflects_typed_value() {
    let mut session = session();
    let input = session
        .host()
        .document()
        .get_element_by_id("text-input")
        .unwrap();

    assert_eq!(session.read_and_echo_input().unwrap(), None);

    session
        .host_mut()
        .document_mut()
        .set_value(input, "hello scos")
        .unwrap();
    assert_eq!(
        session.read_and_echo_input().unwrap().as_deref(),
        Some("hello scos")
    );
    assert_eq!(
        session.host().dialog_messages(),
        vec![EMPTY_INPUT_ALERT, "You entered: hello scos"]
    );
}

#[test]
fn restyle_title_converges() {
    let mut session = session();
    session.restyle_title().unwrap();
    let title = session
        .host()
        .document()
        .get_element_by_id("main-title")
        .unwrap();
    let once = session.host().document().outer_html(title).unwrap();

    session.restyle_title().unwrap();
    let twice = session.host().document().outer_html(title).unwrap();

    assert_eq!(once, twice);
    assert_eq!(
        session.host().document().text_content(title).unwrap(),
        TITLE_ACTIVE_TEXT
    );
}

#[test]
fn dynamic_sections_accumulate() {
    let host = FakeHost::from_html("<main></main>").unwrap();
    let mut session = PageSession::new(host, PageConfig::default());
    let main = main_id(&session);

    assert_eq!(session.host().document().child_element_count(main).unwrap(), 0);
    session.append_dynamic_section().unwrap();

    let doc = session.host().document();
    assert_eq!(doc.child_element_count(main).unwrap(), 1);
    let heading = doc.query_selector("main > section > h3").unwrap().unwrap();
    assert_eq!(doc.text_content(heading).unwrap(), "Dynamic Content");

    for expected in 2..=4 {
        session.append_dynamic_section().unwrap();
        assert_eq!(
            session.host().document().child_element_count(main).unwrap(),
            expected
        );
    }
}

#[test]
fn append_keeps_existing_children() {
    let mut session = session();
    let main = main_id(&session);
    let before = session
        .host()
        .document()
        .arena()
        .element_children(main)
        .unwrap();

    session.append_dynamic_section().unwrap();

    let after = session
        .host()
        .document()
        .arena()
        .element_children(main)
        .unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], before.as_slice());
}

#[test]
fn toggle_twice_restores_state() {
    let mut session = session();
    let panel = session
        .host()
        .document()
        .get_element_by_id("info-panel")
        .unwrap();

    session.toggle_visibility("info-panel").unwrap();
    assert!(session.host().document().get(panel).unwrap().is_hidden());

    session.toggle_visibility("info-panel").unwrap();
    assert!(!session.host().document().get(panel).unwrap().is_hidden());
}

#[test]
fn title_click_wiring_happens_once() {
    let mut session = session();
    assert_eq!(session.ready_state(), ReadyState::Loading);

    session.dom_content_loaded().unwrap();
    session.dom_content_loaded().unwrap();

    let title = session
        .host()
        .document()
        .get_element_by_id("main-title")
        .unwrap();
    assert_eq!(
        session.host().document().style(title, "cursor").unwrap(),
        Some("pointer")
    );
    assert_eq!(session.click(title).unwrap(), 1);
    assert_eq!(
        session.host().document().text_content(title).unwrap(),
        TITLE_ACTIVE_TEXT
    );
    assert_eq!(
        session.host().console_lines(),
        &[(
            ConsoleLevel::Log,
            "SCos Browser JavaScript loaded successfully!".to_string()
        )]
    );
}

#[test]
fn navigation_hands_back_the_host() {
    let host = session().navigate("/docs/help.html").unwrap();
    assert_eq!(
        host.navigations(),
        &[Navigation::Navigate {
            url: "http://localhost/docs/help.html".to_string()
        }]
    );
    assert_eq!(host.location(), "http://localhost/docs/help.html");
}

#[test]
fn inline_script_stays_text() {
    let session = session();
    let doc = session.host().document();
    let script = doc.query_selector("body > script").unwrap().unwrap();

    assert!(doc
        .text_content(script)
        .unwrap()
        .contains("i<features.length"));
    assert!(doc.query_selector("li").unwrap().is_none());
}

#[test]
fn echo_reads_textarea_text() {
    let host = FakeHost::from_html(r#"<textarea id="text-input">typed text</textarea>"#).unwrap();
    let mut session = PageSession::new(host, PageConfig::default());

    assert_eq!(
        session.read_and_echo_input().unwrap().as_deref(),
        Some("typed text")
    );
    assert_eq!(
        session.host().dialog_messages(),
        vec!["You entered: typed text"]
    );
}

#[test]
fn browser_info_is_exposed() {
    let session = session();
    assert_eq!(session.browser_info(), BrowserInfo::scos());
    assert!(session
        .browser_info()
        .display_info()
        .starts_with("SCos Browser v1.0\n"));
}

#[tokio::test(start_paused = true)]
async fn load_data_honors_configured_delay() {
    let config = PageConfig::from_json(r#"{ "load_delay_ms": 250 }"#).unwrap();
    let host = FakeHost::from_html(DEMO_PAGE).unwrap();
    let mut session = PageSession::new(host, config);
    let mut rx = session.event_bus.subscribe();

    let start = tokio::time::Instant::now();
    let value = session.run_script_load().await.unwrap();

    assert_eq!(value, "Data loaded successfully!");
    assert!(start.elapsed() >= Duration::from_millis(250));
    assert!(start.elapsed() < Duration::from_millis(1000));

    let mut saw_loaded = false;
    while let Ok(event) = rx.try_recv() {
        if event
            == (PageEvent::DataLoaded {
                result: "Data loaded successfully!".to_string(),
            })
        {
            saw_loaded = true;
        }
    }
    assert!(saw_loaded);
}
