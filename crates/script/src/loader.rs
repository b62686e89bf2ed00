//! Load lifecycle - the one asynchronous operation of the page script
//!
//! `load_data` suspends only at the host timer. Nothing in it can fail
//! today; the `Result` keeps the rejection path in the contract so
//! `report_load` can handle it.

use std::time::Duration;

use crate::error::Result;
use crate::host::{ConsoleLevel, Host};

pub const LOAD_RESULT: &str = "Data loaded successfully!";

/// Resolve to `LOAD_RESULT` after `delay`
pub async fn load_data<H>(host: &H, delay: Duration) -> Result<String>
where
    H: Host + ?Sized,
{
    tracing::debug!("load_data scheduled in {:?}", delay);
    host.sleep(delay).await;
    Ok(LOAD_RESULT.to_string())
}

/// Continuation for `load_data`: log the value, or the error
pub fn report_load<H>(host: &mut H, result: &Result<String>)
where
    H: Host + ?Sized,
{
    match result {
        Ok(value) => host.console(ConsoleLevel::Log, value),
        Err(e) => host.console(ConsoleLevel::Error, &format!("Error loading data: {}", e)),
    }
}
