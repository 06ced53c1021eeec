use url::Url;

/// Error during fetch. Never crosses the relay boundary; the relay logs it
/// and answers with `content: null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

/// Something that can turn a URL into document text.
///
/// `HttpFetcher` is the real implementation; tests substitute their own.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP GET with a browser-like identity.
///
/// No request timeout is set; callers handle perceived latency.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(
                "Mozilla/5.0 (compatible; linkpeek/",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .timeout(None::<std::time::Duration>)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::new(format!("Client error: {}", e)))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_content(&self.client, url)
    }
}

/// Fetch a URL and return its body text (blocking). One attempt, no retries.
pub fn fetch_content(
    client: &reqwest::blocking::Client,
    url_str: &str,
) -> Result<String, FetchError> {
    let parsed = validate_url(url_str)?;

    let response = client
        .get(parsed.as_str())
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .map_err(|e| FetchError::new(format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(format!("HTTP {} for {}", status.as_u16(), url_str)));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_string();
    if !is_textual(&content_type) {
        return Err(FetchError::new(format!("Not a text response: {}", content_type)));
    }

    response
        .text()
        .map_err(|e| FetchError::new(format!("Failed to read body: {}", e)))
}

/// Only absolute http(s) URLs are fetched.
pub fn validate_url(url_str: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url_str).map_err(|e| FetchError::new(format!("Invalid URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::new(format!("Unsupported scheme: {}", other))),
    }
}

/// Whether a `Content-Type` value names something readable as text.
pub fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.is_empty()
        || mime.starts_with("text/")
        || mime.ends_with("+xml")
        || mime.ends_with("/xml")
        || mime.ends_with("/json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_http_schemes() {
        assert!(validate_url("https://example.com/a").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("/relative").is_err());
    }

    #[test]
    fn textual_content_types() {
        assert!(is_textual("text/html; charset=utf-8"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(is_textual("application/json"));
        assert!(!is_textual("image/png"));
        assert!(!is_textual("application/octet-stream"));
    }
}
