use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// The canonical `local@domain.tld` shape. Anything fancier is the
/// downstream validator's problem.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("email pattern is valid")
});

/// Asset URLs in minified markup ("logo@2x.site.com.png" and friends) match
/// the email shape; these suffixes weed them out.
pub const IMAGE_SUFFIXES: [&str; 6] = [".png", ".jpg", ".jpeg", ".svg", ".gif", ".webp"];

/// Scan text for email-shaped tokens, lower-cased and de-duplicated.
pub fn extract_emails(text: &str) -> HashSet<String> {
    let mut emails = HashSet::new();

    for found in EMAIL_PATTERN.find_iter(text) {
        let email = found.as_str().to_lowercase();
        if IMAGE_SUFFIXES.iter().any(|suffix| email.ends_with(suffix)) {
            debug!("Skipping asset-like match {}", email);
            continue;
        }
        emails.insert(email);
    }

    emails
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_and_normalizes() {
        let emails = extract_emails("Reach us at Info@Example.COM or sales@example.com.");
        assert_eq!(emails.len(), 2);
        assert!(emails.contains("info@example.com"));
        assert!(emails.contains("sales@example.com"));
    }

    #[test]
    fn test_case_insensitive_equality() {
        let lower = extract_emails("contact@site.com");
        let upper = extract_emails("CONTACT@SITE.COM");
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_image_suffixes_excluded() {
        assert!(extract_emails("logo@site.com.png").is_empty());
        assert!(extract_emails("icon@2x.example.org.svg").is_empty());
        assert!(extract_emails("banner@cdn.example.org.webp").is_empty());

        let kept = extract_emails("contact@site.com");
        assert_eq!(kept, HashSet::from(["contact@site.com".to_string()]));
    }

    #[test]
    fn test_idempotent_over_own_output() {
        let text = "a@b.co X@Y.ORG junk logo@site.com.png team@firm.io team@firm.io";
        let first = extract_emails(text);

        let rejoined = first.iter().cloned().collect::<Vec<_>>().join(" ");
        let second = extract_emails(&rejoined);

        assert_eq!(first, second);
    }

    #[test]
    fn test_ignores_non_email_text() {
        assert!(extract_emails("no emails here, just @mentions and half@done").is_empty());
        assert!(extract_emails("").is_empty());
    }

    #[test]
    fn test_extracts_from_markup() {
        let html = r#"<a href="mailto:info@clinic.example">info@clinic.example</a>
                      <img src="sprite@2x.assets.example.png">"#;
        let emails = extract_emails(html);
        assert_eq!(emails, HashSet::from(["info@clinic.example".to_string()]));
    }
}
