//! Transport helpers shared by the reqwest adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

/// Build a client with a whole-request timeout.
pub(crate) fn client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Resolve `path` beneath `base`, keeping any path prefix on the base URL.
///
/// `http://gw/user-svc` and `http://gw/user-svc/` both resolve `/api/users`
/// to `http://gw/user-svc/api/users`.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    base.join(path.trim_start_matches('/'))
}

/// Split transport failures into timeout and other failures.
pub(crate) fn map_transport_error<E>(
    error: &reqwest::Error,
    timeout: impl FnOnce(String) -> E,
    transport: impl FnOnce(String) -> E,
) -> E {
    if error.is_timeout() {
        timeout(error.to_string())
    } else {
        transport(error.to_string())
    }
}

/// Human-readable summary of a non-success response.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
