//! Detail extraction from a listing's apply page.

use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::info;

use crate::listings::ScrapeError;
use crate::skills::JobSkillExtractor;

const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SECTION_CHARS: usize = 800;
const NO_REQUIREMENTS: &str = "Requirements not available";
const DESCRIPTION_PREFIX: &str = "About this company: ";
const FALLBACK_DESCRIPTION: &str = "About this company: Software Engineering internship position. \
    Please click 'Apply Here' for detailed information.";

const DESCRIPTION_SELECTORS: &str = "[data-automation-id=\"jobDescriptionText\"], \
    [data-automation-id=\"jobDescription\"], .job-description, .job-description-text, \
    [data-testid=\"job-description\"], .job-details, .job-content, .description, \
    #job-description, .job-summary, .role-description, .job-info, .position-description, \
    .job-overview";

const SECTION_KEYWORDS: &[&str] = &[
    "experience",
    "education",
    "required skills",
    "desired skills",
    "qualifications",
    "requirements",
    "what you need",
    "what you'll need",
    "technical skills",
    "competencies",
    "prerequisites",
];

const REQUIREMENT_WORDS: &[&str] = &[
    "experience",
    "education",
    "required",
    "desired",
    "skills",
    "knowledge",
    "ability",
    "degree",
    "background",
    "qualification",
];

/// Navigation and UI chrome that should never end up in a description.
const UI_NOISE: &[&str] = &[
    "menu",
    "dashboard",
    "log in",
    "sign up",
    "share",
    "get referrals",
    "job tracker",
    "claim your company",
    "open user menu",
    "cookie",
    "privacy policy",
];

const LABELS_TO_STRIP: &[&str] = &[
    "about this role:",
    "about the role:",
    "role description:",
    "position description:",
    "job requirements:",
    "requirements:",
    "qualifications:",
];

#[derive(Debug, Clone, Serialize)]
pub struct JobDetails {
    pub description: String,
    pub job_requirements: String,
    pub required_skills: Vec<String>,
    pub source: &'static str,
}

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).unwrap())
}

fn spaced_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn browser_client() -> Result<Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(PAGE_TIMEOUT)
        .build()?)
}

/// Follows `apply_link` and extracts a description, requirements and skills.
pub async fn fetch_job_details(
    apply_link: &str,
    extractor: &JobSkillExtractor,
) -> Result<JobDetails, ScrapeError> {
    let client = browser_client()?;
    let response = client.get(apply_link).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            status: status.as_u16(),
            url: apply_link.to_string(),
        });
    }
    let html = response.text().await?;

    // Html is not Send; finish all DOM work before the next await.
    let (mut description, job_requirements, page_text) = {
        let document = Html::parse_document(&html);
        (
            extract_description(&document),
            extract_requirements(&document),
            page_text(&document),
        )
    };

    if job_requirements != NO_REQUIREMENTS {
        description.push_str("\n\nJob Requirements:\n");
        description.push_str(&job_requirements);
    }

    let required_skills = extractor.extract("", &page_text, "").await;
    info!(
        "Extracted {} skills from apply page {apply_link}",
        required_skills.len()
    );

    Ok(JobDetails {
        description,
        job_requirements,
        required_skills,
        source: "company_website",
    })
}

fn page_text(document: &Html) -> String {
    static BODY: OnceLock<Selector> = OnceLock::new();
    document
        .select(selector(&BODY, "body"))
        .next()
        .map(|body| spaced_text(&body))
        .unwrap_or_default()
}

/// A cleaned summary of the posting, at most 800 characters plus prefix.
pub fn extract_description(document: &Html) -> String {
    static CONTAINERS: OnceLock<Selector> = OnceLock::new();

    let from_container = document
        .select(selector(&CONTAINERS, DESCRIPTION_SELECTORS))
        .map(|el| spaced_text(&el))
        .find(|text| text.chars().count() > 50);

    let text = from_container.or_else(|| {
        let sentences: Vec<String> = page_text(document)
            .split('.')
            .map(str::trim)
            .filter(|s| s.chars().count() > 20)
            .filter(|s| {
                let lower = s.to_lowercase();
                !UI_NOISE.iter().any(|noise| lower.contains(noise))
            })
            .take(8)
            .map(str::to_string)
            .collect();
        (!sentences.is_empty()).then(|| sentences.join(". "))
    });

    match text {
        Some(text) => clean_description(&text),
        None => FALLBACK_DESCRIPTION.to_string(),
    }
}

fn clean_description(raw: &str) -> String {
    let mut text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    for label in LABELS_TO_STRIP {
        loop {
            let lower = text.to_lowercase();
            // Byte offsets only line up when lowercasing kept the length.
            match lower.find(label) {
                Some(pos) if lower.len() == text.len() => {
                    text.replace_range(pos..pos + label.len(), "")
                }
                _ => break,
            }
        }
    }
    let mut text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(stripped) = text.strip_suffix("...") {
        text = format!("{stripped}.");
    } else if !text.ends_with('.') {
        text.push('.');
    }
    while text.contains("..") {
        text = text.replace("..", ".");
    }

    if text.chars().count() > MAX_SECTION_CHARS {
        let truncated: String = text.chars().take(MAX_SECTION_CHARS).collect();
        text = match truncated.rfind('.') {
            Some(last) if last > 600 => truncated[..=last].to_string(),
            _ => format!("{truncated}."),
        };
    }

    if text.to_lowercase().starts_with("about this company") {
        text
    } else {
        format!("{DESCRIPTION_PREFIX}{text}")
    }
}

/// Requirements as bullet lines: headed sections first, then list items,
/// then requirement-bearing sentences.
pub fn extract_requirements(document: &Html) -> String {
    let mut lines = headed_sections(document);

    if lines.is_empty() {
        lines = list_items(document);
    }
    if lines.is_empty() {
        lines = requirement_sentences(&page_text(document).to_lowercase());
    }
    if lines.is_empty() {
        return NO_REQUIREMENTS.to_string();
    }

    let mut seen = HashSet::new();
    lines.retain(|line| line.is_empty() || seen.insert(line.clone()));

    let joined = lines.join("\n");
    if joined.chars().count() <= MAX_SECTION_CHARS {
        return joined.trim_end().to_string();
    }

    let mut kept = Vec::new();
    let mut total = 0;
    for line in &lines {
        let len = line.chars().count();
        if total + len > MAX_SECTION_CHARS {
            break;
        }
        kept.push(line.as_str());
        total += len;
    }
    format!("{}...", kept.join("\n"))
}

fn is_heading(element: &ElementRef<'_>) -> bool {
    matches!(element.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn headed_sections(document: &Html) -> Vec<String> {
    static HEADINGS: OnceLock<Selector> = OnceLock::new();
    let mut lines = Vec::new();

    for heading in document.select(selector(&HEADINGS, "h1, h2, h3, h4, h5, h6, strong, b")) {
        let title = spaced_text(&heading);
        let lower = title.to_lowercase();
        if title.chars().count() > 80 || !SECTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            continue;
        }

        let items: Vec<String> = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|el| !is_heading(el))
            .take(10)
            .filter(|el| matches!(el.value().name(), "p" | "li" | "div" | "span" | "ul" | "ol"))
            .map(|el| spaced_text(&el))
            .filter(|text| text.chars().count() > 10)
            .take(3)
            .collect();

        if !items.is_empty() {
            lines.push(format!("{}:", title.trim_end_matches(':')));
            lines.extend(items.into_iter().map(|item| format!("  • {item}")));
            lines.push(String::new());
        }
    }

    lines
}

fn list_items(document: &Html) -> Vec<String> {
    static LISTS: OnceLock<Selector> = OnceLock::new();
    static ITEMS: OnceLock<Selector> = OnceLock::new();

    document
        .select(selector(&LISTS, "ul, ol"))
        .flat_map(|list| {
            list.select(selector(&ITEMS, "li"))
                .take(5)
                .map(|li| spaced_text(&li))
                .collect::<Vec<_>>()
        })
        .filter(|text| text.chars().count() > 10)
        .map(|text| format!("  • {text}"))
        .collect()
}

fn requirement_sentences(page_lower: &str) -> Vec<String> {
    page_lower
        .split('.')
        .take(5)
        .map(str::trim)
        .filter(|s| s.chars().count() > 20 && REQUIREMENT_WORDS.iter().any(|w| s.contains(w)))
        .map(|s| format!("  • {s}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTING: &str = r#"<html><head><title>SWE Intern</title></head><body>
        <nav>Open menu Log in</nav>
        <div class="job-description">
          <p>We are looking for a software engineering intern to join our platform team in Austin.</p>
          <h3>Qualifications</h3>
          <ul><li>Currently pursuing a degree in Computer Science</li><li>Experience with Python or Go</li></ul>
          <p>Strong communication skills and teamwork experience.</p>
          <h3>Benefits</h3>
          <p>Free lunch and a generous housing stipend for the summer.</p>
        </div>
        </body></html>"#;

    #[test]
    fn test_description_prefers_known_container() {
        let document = Html::parse_document(POSTING);
        let description = extract_description(&document);
        assert!(description.starts_with("About this company: We are looking for"));
        assert!(!description.contains("Open menu"));
        assert!(description.ends_with('.'));
    }

    #[test]
    fn test_requirements_from_headed_section() {
        let document = Html::parse_document(POSTING);
        let requirements = extract_requirements(&document);
        let lines: Vec<&str> = requirements.lines().collect();
        assert_eq!(lines[0], "Qualifications:");
        assert!(lines[1].contains("Currently pursuing a degree"));
        assert!(lines[2].contains("Strong communication skills"));
        assert!(!requirements.contains("housing stipend"));
    }

    #[test]
    fn test_requirements_fall_back_to_sentences() {
        let document = Html::parse_document(
            "<html><body><p>Interns need a degree in computer science. Lunch is provided daily for everyone.</p></body></html>",
        );
        let requirements = extract_requirements(&document);
        assert_eq!(requirements, "  • interns need a degree in computer science");
    }

    #[test]
    fn test_empty_page_has_no_requirements() {
        let document = Html::parse_document("<html><body><p>Hi</p></body></html>");
        assert_eq!(extract_requirements(&document), NO_REQUIREMENTS);
        assert_eq!(extract_description(&document), FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_long_description_is_truncated() {
        let sentence = "This internship builds distributed systems for payments. ";
        let body = format!("<div class=\"description\">{}</div>", sentence.repeat(30));
        let document = Html::parse_document(&body);
        let description = extract_description(&document);
        assert!(description.chars().count() <= MAX_SECTION_CHARS + DESCRIPTION_PREFIX.len() + 1);
        assert!(description.ends_with('.'));
    }

    #[tokio::test]
    async fn test_fetch_job_details_from_page() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/jobs/42")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(POSTING)
            .create_async()
            .await;

        let extractor = JobSkillExtractor::new(None, false);
        let details = fetch_job_details(&format!("{}/jobs/42", server.url()), &extractor)
            .await
            .unwrap();

        assert_eq!(details.source, "company_website");
        assert!(details.description.contains("Job Requirements:"));
        assert_eq!(details.required_skills, vec!["Python"]);
    }
}
