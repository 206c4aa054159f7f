//! The closed set of supported search providers.
//!
//! Each provider is a plain configuration record: URL template, own domain
//! (so result links pointing back into the engine get dropped), referer,
//! pacing range and the wider backoff range used once the engine pushes back.
//! Callers select providers by name lookup, never by branching on strings.

/// Result-page stride used by every supported engine.
pub const RESULTS_PER_PAGE: u32 = 10;

/// Header block sent with every search-engine request.
pub const BASE_HEADERS: [(&str, &str); 7] = [
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.5"),
    ("Accept-Encoding", "gzip, deflate, br"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Cache-Control", "max-age=0"),
    ("DNT", "1"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProvider {
    pub name: &'static str,
    /// URL template with `{query}` and `{offset}` placeholders.
    pub url_template: &'static str,
    /// The engine's own domain; links back into it are never followed.
    pub domain: &'static str,
    pub referer: &'static str,
    /// Inter-request pacing range in milliseconds.
    pub pacing_ms: (u64, u64),
    /// Backoff range between retry attempts, wider than pacing.
    pub backoff_ms: (u64, u64),
}

static PROVIDERS: [SearchProvider; 4] = [
    SearchProvider {
        name: "bing",
        url_template: "https://www.bing.com/search?q={query}&first={offset}",
        domain: "bing.com",
        referer: "https://www.bing.com/",
        pacing_ms: (5000, 8000),
        backoff_ms: (8000, 16000),
    },
    SearchProvider {
        name: "google",
        url_template: "https://www.google.com/search?q={query}&start={offset}",
        domain: "google.com",
        referer: "https://www.google.com/",
        pacing_ms: (8000, 12000),
        backoff_ms: (12000, 24000),
    },
    SearchProvider {
        name: "yahoo",
        url_template: "https://search.yahoo.com/search?p={query}&b={offset}",
        domain: "yahoo.com",
        referer: "https://search.yahoo.com/",
        pacing_ms: (4000, 6000),
        backoff_ms: (6000, 12000),
    },
    SearchProvider {
        name: "duckduckgo",
        url_template: "https://duckduckgo.com/html/?q={query}&s={offset}",
        domain: "duckduckgo.com",
        referer: "https://duckduckgo.com/",
        pacing_ms: (3000, 5000),
        backoff_ms: (5000, 10000),
    },
];

/// All providers known at startup. The set is fixed for the life of a run.
pub fn known_providers() -> &'static [SearchProvider] {
    &PROVIDERS
}

pub fn provider_by_name(name: &str) -> Option<&'static SearchProvider> {
    PROVIDERS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl SearchProvider {
    /// Build the search URL for one result page of an encoded query.
    pub fn search_url(&self, query: &str, page_index: u32) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let offset = page_index * RESULTS_PER_PAGE;
        self.url_template
            .replace("{query}", &encoded)
            .replace("{offset}", &offset.to_string())
    }
}
