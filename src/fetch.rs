use std::io::Read;
use std::time::Duration;

use log::{info, warn};

use crate::error::FetchError;

/// Default per-request timeout for dataset retrieval.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `into_string` caps bodies at 10 MiB; flow tables are larger.
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

/// Fetches a table resource, enforcing a hard timeout. Non-2xx status,
/// transport failure, and timeout all surface as distinct `FetchError`
/// variants; a timed-out request fails instead of hanging the run.
pub fn fetch_table(url: &str, timeout: Duration) -> Result<String, FetchError> {
    let agent = ureq::AgentBuilder::new()
        .timeout(timeout)
        .build();
    let response = match agent.get(url).call() {
        Ok(r) => r,
        Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
        Err(ureq::Error::Transport(t)) => return Err(FetchError::Transport(t.to_string())),
    };
    let mut body = String::new();
    response
        .into_reader()
        .take(MAX_BODY_BYTES)
        .read_to_string(&mut body)?;
    info!("fetched {} bytes from {url}", body.len());
    Ok(body)
}

/// Fetches the optional feature-quality side table. Absence or failure is
/// not an error: the explorer just omits the metrics annotations.
pub fn fetch_metrics_table(url: &str, timeout: Duration) -> Option<String> {
    match fetch_table(url, timeout) {
        Ok(body) => Some(body),
        Err(e) => {
            warn!("feature metrics table unavailable ({e}); continuing without it");
            None
        }
    }
}
