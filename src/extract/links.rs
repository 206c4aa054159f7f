use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::error::HarvestError;

/// Business directories and contact-page fragments that tend to carry
/// harvestable addresses. Links matching any of these are tried first.
pub const DIRECTORY_PATTERNS: [&str; 15] = [
    "yellowpages.com",
    "yell.com",
    "thomsonlocal.com",
    "hotfrog.com",
    "manta.com",
    "bizapedia.com",
    "linkedin.com/company",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "contact",
    "about",
    "team",
    "staff",
    "people",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkPriority {
    Directory,
    Generic,
}

/// An absolute URL pulled from a results page, tagged with its yield class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateLink {
    pub url: Url,
    pub priority: LinkPriority,
}

/// Pulls outbound candidate links from a search-results page.
pub struct LinkExtractor {
    anchor_selector: Selector,
}

impl LinkExtractor {
    pub fn new() -> Result<Self, HarvestError> {
        Ok(Self {
            anchor_selector: Selector::parse("a[href]")
                .map_err(|e| HarvestError::ParseError(format!("Invalid anchor selector: {}", e)))?,
        })
    }

    /// Extract absolute http/https links, dropping anything that points back
    /// into `self_domain`. Duplicates collapse; malformed hrefs are skipped,
    /// never an error.
    pub fn extract_links(&self, html: &str, self_domain: &str) -> HashSet<Url> {
        let document = Html::parse_document(html);
        let mut links = HashSet::new();

        for anchor in document.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let url = match Url::parse(href) {
                Ok(url) => url,
                Err(_) => {
                    // relative or junk href, not a candidate
                    continue;
                }
            };
            if url.scheme() != "http" && url.scheme() != "https" {
                continue;
            }
            let Some(host) = url.host_str() else {
                continue;
            };
            if host_matches(host, self_domain) {
                debug!("Dropping self-referential link {}", url);
                continue;
            }
            links.insert(url);
        }

        links
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new().expect("Failed to create default LinkExtractor")
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host.eq_ignore_ascii_case(domain)
        || host
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
}

pub fn classify(url: &Url) -> LinkPriority {
    let haystack = url.as_str().to_lowercase();
    if DIRECTORY_PATTERNS
        .iter()
        .any(|pattern| haystack.contains(pattern))
    {
        LinkPriority::Directory
    } else {
        LinkPriority::Generic
    }
}

/// Stable partition: directory/contact matches first, everything else after.
/// This only reorders which links are tried first under the per-page cap; it
/// never changes eligibility.
pub fn prioritize(links: HashSet<Url>) -> Vec<CandidateLink> {
    let mut ordered = Vec::with_capacity(links.len());
    let mut generic = Vec::new();

    for url in links {
        let priority = classify(&url);
        let candidate = CandidateLink { url, priority };
        match priority {
            LinkPriority::Directory => ordered.push(candidate),
            LinkPriority::Generic => generic.push(candidate),
        }
    }

    ordered.extend(generic);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_RESULTS_HTML: &str = r#"
    <html><body>
        <ol id="b_results">
            <li class="b_algo"><h2><a href="https://example.org/dentists">Example Dentists</a></h2></li>
            <li class="b_algo"><h2><a href="https://bing.com/maps">Bing Maps</a></h2></li>
            <li class="b_algo"><h2><a href="https://www.bing.com/images">Bing Images</a></h2></li>
            <li class="b_algo"><h2><a href="/search?q=next">Next page</a></h2></li>
            <li class="b_algo"><h2><a href="mailto:someone@example.org">Mail</a></h2></li>
            <li class="b_algo"><h2><a href="ftp://files.example.org/pub">FTP</a></h2></li>
            <li class="b_algo"><h2><a href="https://example.org/dentists">Duplicate</a></h2></li>
            <li class="b_algo"><h2><a href="http://clinic.example.com/contact">Clinic</a></h2></li>
        </ol>
    </body></html>
    "#;

    #[test]
    fn test_extract_links_filters_and_dedupes() {
        let extractor = LinkExtractor::new().unwrap();
        let links = extractor.extract_links(MOCK_RESULTS_HTML, "bing.com");

        let as_strings: HashSet<String> = links.iter().map(|u| u.to_string()).collect();
        assert_eq!(links.len(), 2);
        assert!(as_strings.contains("https://example.org/dentists"));
        assert!(as_strings.contains("http://clinic.example.com/contact"));
    }

    #[test]
    fn test_extract_links_never_returns_self_domain() {
        let extractor = LinkExtractor::new().unwrap();
        let html = r#"<a href="https://bing.com/x">in</a><a href="https://example.org/x">out</a>"#;
        let links = extractor.extract_links(html, "bing.com");

        assert!(links.iter().all(|u| u.host_str() != Some("bing.com")));
        assert_eq!(links.len(), 1);
        assert_eq!(links.iter().next().unwrap().host_str(), Some("example.org"));
    }

    #[test]
    fn test_extract_links_empty_page() {
        let extractor = LinkExtractor::new().unwrap();
        assert!(extractor.extract_links("", "bing.com").is_empty());
        assert!(extractor
            .extract_links("<div><span>incomplete", "bing.com")
            .is_empty());
    }

    #[test]
    fn test_host_matching_is_suffix_safe() {
        assert!(host_matches("bing.com", "bing.com"));
        assert!(host_matches("www.bing.com", "bing.com"));
        assert!(host_matches("cn.BING.com", "bing.com"));
        // a different registrable domain sharing the suffix text is not a match
        assert!(!host_matches("notbing.com", "bing.com"));
    }

    #[test]
    fn test_classify() {
        let directory = Url::parse("https://www.yellowpages.com/dubai/dentists").unwrap();
        let contact = Url::parse("https://clinic.example.com/contact").unwrap();
        let generic = Url::parse("https://clinic.example.com/pricing").unwrap();

        assert_eq!(classify(&directory), LinkPriority::Directory);
        assert_eq!(classify(&contact), LinkPriority::Directory);
        assert_eq!(classify(&generic), LinkPriority::Generic);
    }

    #[test]
    fn test_prioritize_is_stable_partition() {
        let a = Url::parse("https://clinic.example.com/contact").unwrap();
        let b = Url::parse("https://clinic.example.com/pricing").unwrap();
        let c = Url::parse("https://www.yellowpages.com/dubai/dentists").unwrap();

        let links: HashSet<Url> = [a.clone(), b.clone(), c.clone()].into_iter().collect();
        let ordered = prioritize(links);

        assert_eq!(ordered.len(), 3);
        // a and c (in either relative order) come before b
        assert_eq!(ordered[0].priority, LinkPriority::Directory);
        assert_eq!(ordered[1].priority, LinkPriority::Directory);
        assert_eq!(ordered[2].priority, LinkPriority::Generic);
        assert_eq!(ordered[2].url, b);
        assert!(ordered[..2].iter().any(|l| l.url == a));
        assert!(ordered[..2].iter().any(|l| l.url == c));
    }
}
