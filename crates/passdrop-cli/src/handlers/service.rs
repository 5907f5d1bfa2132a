//! Service-level handlers (usage banner, policy headers)

use crate::handlers::{
    HEADER_EXPIRATION_TIME, HEADER_MAX_UPLOAD_SIZE, HEADER_PASS_WORDS_COUNT, HEADER_VERSION,
};
use crate::{ApiError, AppState};
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use passdrop_core::{VERSION, ValidationError};
use std::sync::Arc;

/// GET / - Usage banner
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let drop = &state.config.drop;
    let base_url = base_url(&headers, &state.config.normalized_base_path());

    let body = format!(
        "Passdrop version {version}\n\
         Please use a PUT or a POST request to send a file.\n\
         \n\
         Maximum file size    : {size} ({bytes} bytes)\n\
         Maximum file lifetime: {lifetime}\n\
         \n\
         ** Examples with cURL **\n\
         Simple (using PUT):\n    curl -T myfile.txt {base}/\n\
         Alternative (using POST):\n    curl -F 'data=@myfile.txt' {base}/myfile.txt\n\
         Download:\n    curl -OJ {base}/<password>\n\
         Delete:\n    curl -X DELETE {base}/<password>\n",
        version = VERSION,
        size = human_size(drop.max_upload_size),
        bytes = drop.max_upload_size,
        lifetime = human_lifetime(drop.ttl_secs),
        base = base_url,
    );

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// HEAD / - Advertise server policy
pub async fn policy(State(state): State<Arc<AppState>>) -> Response {
    let drop = &state.config.drop;
    (
        StatusCode::NO_CONTENT,
        [
            (HEADER_VERSION, HeaderValue::from_static(VERSION)),
            (HEADER_EXPIRATION_TIME, HeaderValue::from(drop.ttl_secs)),
            (HEADER_MAX_UPLOAD_SIZE, HeaderValue::from(drop.max_upload_size)),
            (
                HEADER_PASS_WORDS_COUNT,
                HeaderValue::from(state.drop.pass_words_count()),
            ),
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain")),
        ],
    )
        .into_response()
}

/// GET /favicon.ico
pub async fn favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// PUT / and POST / - an upload needs a name
pub async fn missing_name() -> ApiError {
    ApiError::Validation(ValidationError::MissingName)
}

/// Public URL of the service root, honouring reverse-proxy headers
fn base_url(headers: &HeaderMap, base_path: &str) -> String {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    let scheme = get("x-forwarded-proto").unwrap_or("http");
    let host = get("x-forwarded-host")
        .or_else(|| get(header::HOST.as_str()))
        .unwrap_or("localhost");

    let Some(port) = get("x-forwarded-port").and_then(|p| p.parse::<u16>().ok()) else {
        return format!("{}://{}{}", scheme, host, base_path);
    };
    let host = strip_port(host);
    let default_port = match scheme {
        "https" => 443,
        "http" => 80,
        _ => 0,
    };
    if port == default_port {
        format!("{}://{}{}", scheme, host, base_path)
    } else {
        format!("{}://{}:{}{}", scheme, host, port, base_path)
    }
}

/// Host without any `:port` suffix; bracketed IPv6 literals are kept whole
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Binary-unit size with two decimals, e.g. `1.00 MiB`
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Lifetime as days, hours, minutes and seconds; `unlimited` for 0
pub fn human_lifetime(secs: u64) -> String {
    if secs == 0 {
        return "unlimited".to_string();
    }
    let parts = [
        (secs / 86_400, "day"),
        (secs % 86_400 / 3_600, "hour"),
        (secs % 3_600 / 60, "minute"),
        (secs % 60, "second"),
    ];
    parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{} {}(s)", n, unit))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0.00 B");
        assert_eq!(human_size(100), "100.00 B");
        assert_eq!(human_size(1536), "1.50 KiB");
        assert_eq!(human_size(1024 * 1024), "1.00 MiB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.00 GiB");
    }

    #[test]
    fn test_human_lifetime() {
        assert_eq!(human_lifetime(0), "unlimited");
        assert_eq!(human_lifetime(86_400), "1 day(s)");
        assert_eq!(human_lifetime(90_061), "1 day(s), 1 hour(s), 1 minute(s), 1 second(s)");
        assert_eq!(human_lifetime(7_200), "2 hour(s)");
        assert_eq!(human_lifetime(45), "45 second(s)");
    }

    #[test]
    fn test_base_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("drop.local:8080"));
        assert_eq!(base_url(&headers, ""), "http://drop.local:8080");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("files.example.org"));
        assert_eq!(base_url(&headers, "/drop"), "https://files.example.org/drop");
    }

    #[test]
    fn test_base_url_forwarded_port() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("127.0.0.1:8080"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("files.example.org"));
        headers.insert("x-forwarded-port", HeaderValue::from_static("8443"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(base_url(&headers, ""), "https://files.example.org:8443");

        headers.insert("x-forwarded-port", HeaderValue::from_static("443"));
        assert_eq!(base_url(&headers, ""), "https://files.example.org");

        // The forwarded port replaces one already carried by the host.
        headers.remove("x-forwarded-host");
        headers.remove("x-forwarded-proto");
        headers.insert("x-forwarded-port", HeaderValue::from_static("9000"));
        assert_eq!(base_url(&headers, "/d"), "http://127.0.0.1:9000/d");

        headers.insert("x-forwarded-port", HeaderValue::from_static("not-a-port"));
        assert_eq!(base_url(&headers, ""), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.org:8080"), "example.org");
        assert_eq!(strip_port("example.org"), "example.org");
        assert_eq!(strip_port("[::1]:8080"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
    }
}
