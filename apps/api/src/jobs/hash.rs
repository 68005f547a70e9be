use sha2::{Digest, Sha256};
use url::Url;

fn normalize(field: &str) -> String {
    field.trim().to_lowercase()
}

/// Host of an absolute URL, lower-cased. Anything else hashes as "".
fn link_domain(apply_link: &str) -> String {
    Url::parse(apply_link.trim())
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

/// Content hash identifying a listing across scrapes.
///
/// Only the apply link's domain participates, so tracking parameters and
/// path changes on the same site do not create a new listing.
pub fn job_hash(company: &str, title: &str, location: &str, apply_link: &str) -> String {
    let content = format!(
        "{}|{}|{}|{}",
        normalize(company),
        normalize(title),
        normalize(location),
        link_domain(apply_link)
    );
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = job_hash("Acme", "SWE Intern", "NYC", "https://acme.com/jobs/1");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_ignores_case_whitespace_and_path() {
        let a = job_hash("Acme", "SWE Intern", "NYC", "https://careers.acme.com/jobs/1?utm=x");
        let b = job_hash("  ACME ", "swe intern", " nyc", "https://Careers.Acme.com/other");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_distinguishes_domains_and_fields() {
        let base = job_hash("Acme", "SWE Intern", "NYC", "https://acme.com/1");
        assert_ne!(base, job_hash("Acme", "SWE Intern", "NYC", "https://jobs.lever.co/acme"));
        assert_ne!(base, job_hash("Acme", "SWE Intern", "SF", "https://acme.com/1"));
    }

    #[test]
    fn test_relative_links_hash_with_empty_domain() {
        assert_eq!(
            job_hash("Acme", "SWE Intern", "NYC", "#"),
            job_hash("Acme", "SWE Intern", "NYC", "not a url")
        );
    }
}
