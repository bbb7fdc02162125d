use std::time::Duration;

use tracing::debug;

use crate::error::FetchError;

const SESSIONS_ENDPOINT: &str = "rest/v1/time_tracking_sessions";
const SESSIONS_SELECT: &str = "*,category:time_tracking_categories(id,name,color),task:tasks(id,name),user:users(display_name,avatar_url)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_RETRIES: usize = 3;
const RETRY_BACKOFF_MS: u64 = 250;

/// Newest-first session listing for one workspace
pub(super) fn sessions_url(base: &str, workspace: &str) -> String {
    format!(
        "{}/{SESSIONS_ENDPOINT}?select={SESSIONS_SELECT}&ws_id=eq.{workspace}&order=start_time.desc",
        base.trim_end_matches('/')
    )
}

/// Fetch the raw session rows, retrying with linear backoff
pub(super) fn fetch_sessions_raw(
    base: &str,
    api_key: &str,
    workspace: &str,
) -> Result<serde_json::Value, FetchError> {
    let url = sessions_url(base, workspace);
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(FETCH_TIMEOUT))
        .build()
        .into();

    let mut last_error = String::new();
    for attempt in 0..FETCH_RETRIES {
        let result = agent
            .get(&url)
            .header("apikey", api_key)
            .header("Authorization", &format!("Bearer {api_key}"))
            .header("Accept", "application/json")
            .call();

        match result {
            Ok(response) => {
                let mut body = response.into_body();
                match serde_json::from_reader::<_, serde_json::Value>(body.as_reader()) {
                    Ok(parsed) if parsed.is_array() => return Ok(parsed),
                    Ok(_) => last_error = "response is not a list of sessions".to_string(),
                    Err(err) => last_error = format!("invalid response body: {err}"),
                }
            }
            Err(err) => last_error = err.to_string(),
        }
        debug!(attempt = attempt + 1, "fetch failed: {last_error}");

        if attempt + 1 < FETCH_RETRIES {
            std::thread::sleep(Duration::from_millis(
                RETRY_BACKOFF_MS * (attempt as u64 + 1),
            ));
        }
    }

    Err(FetchError::Exhausted {
        attempts: FETCH_RETRIES,
        message: last_error,
    })
}
