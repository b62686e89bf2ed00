//! Drive the page script against an in-memory demo page
//!
//! Run with `RUST_LOG=debug` to see lookups and dispatches.

use page_script::{FakeHost, Host, PageConfig, PageSession};
use tracing_subscriber::EnvFilter;

const DEMO_PAGE: &str = r#"<html>
  <body>
    <h1 id="main-title">SCos Browser</h1>
    <main>
      <button id="test-button">Run</button>
      <input id="text-input" type="text" value="hello from the demo">
      <div id="info-panel">Browser details</div>
    </main>
  </body>
</html>"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PageConfig {
        page_url: Some("http://localhost/scos/index.html".to_string()),
        ..PageConfig::default()
    };
    let host = FakeHost::from_config(DEMO_PAGE, &config)?;
    let mut session = PageSession::new(host, config);

    session.dom_content_loaded()?;
    session.run_demo_action()?;
    session.read_and_echo_input()?;
    session.click_element("main-title")?;
    session.append_dynamic_section()?;
    session.toggle_visibility("info-panel")?;
    session.notify(&page_script::greet_user(None));
    println!("{}", session.browser_info().display_info());

    session.run_script_load().await?;

    for dialog in session.host().dialogs() {
        println!("[dialog] {}", dialog.message.replace('\n', " "));
    }
    let body = session.host().document().body().unwrap_or(0);
    println!("{}", session.host().document().outer_html(body)?);

    let host = session.navigate("about.html")?;
    println!("navigated to {}", host.location());

    Ok(())
}
