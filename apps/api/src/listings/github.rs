//! Parsing of the community internship README, an HTML table embedded in markdown.

use std::sync::OnceLock;

use chrono::NaiveDate;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::listings::{dates, ScrapeError};
use crate::models::job::{
    JobType, ListingLevel, ListingMetadata, LocationType, ScrapedJob, Sponsorship, GITHUB_SOURCE,
};
use crate::skills::inference::contains_term;

/// Rows whose company cell is this marker continue the previous company.
const CONTINUATION_MARKER: &str = "↳";
const SIMPLIFY_PREFIX: &str = "https://simplify.jobs/p/";
const DATE_HEADER_KEYWORDS: &[&str] = &["date posted", "posted", "date added", "added", "date", "age"];

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).unwrap())
}

/// Fetches the raw README. Non-2xx responses are errors.
pub async fn fetch_readme(client: &Client, url: &str) -> Result<String, ScrapeError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

/// Text of an element with each text node trimmed, joined by `separator`.
fn joined_text(element: &ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn cell_text(element: &ElementRef<'_>) -> String {
    joined_text(element, "")
}

fn apply_link(cell: &ElementRef<'_>) -> String {
    static ANCHOR: OnceLock<Selector> = OnceLock::new();
    let hrefs: Vec<&str> = cell
        .select(selector(&ANCHOR, "a"))
        .filter_map(|a| a.value().attr("href"))
        .collect();

    hrefs
        .iter()
        .find(|href| !href.is_empty() && !href.starts_with(SIMPLIFY_PREFIX))
        .or_else(|| hrefs.first())
        .map(|href| href.to_string())
        .filter(|href| !href.is_empty())
        .unwrap_or_else(|| "#".to_string())
}

fn date_column(header: &ElementRef<'_>) -> Option<usize> {
    static HEADER_CELL: OnceLock<Selector> = OnceLock::new();
    header
        .select(selector(&HEADER_CELL, "th, td"))
        .map(|cell| cell_text(&cell).to_lowercase())
        .position(|h| DATE_HEADER_KEYWORDS.iter().any(|k| h.contains(k)))
}

/// Parses the first table of the README into listings.
///
/// Skills are left empty here; they are attached after filtering.
pub fn parse_internship_table(content: &str, max_results: usize, today: NaiveDate) -> Vec<ScrapedJob> {
    static TABLE: OnceLock<Selector> = OnceLock::new();
    static ROW: OnceLock<Selector> = OnceLock::new();
    static CELL: OnceLock<Selector> = OnceLock::new();
    static ANCHOR: OnceLock<Selector> = OnceLock::new();

    let document = Html::parse_document(content);
    let Some(table) = document.select(selector(&TABLE, "table")).next() else {
        warn!("No tables found in README content ({} chars)", content.len());
        return Vec::new();
    };

    let rows: Vec<ElementRef<'_>> = table.select(selector(&ROW, "tr")).collect();
    let Some((header, body)) = rows.split_first() else {
        return Vec::new();
    };
    let date_index = date_column(header);
    debug!("README table: {} rows, date column {:?}", rows.len(), date_index);

    let mut jobs = Vec::new();
    let mut previous_company: Option<String> = None;

    for row in body {
        if jobs.len() >= max_results {
            break;
        }

        let cells: Vec<ElementRef<'_>> = row.select(selector(&CELL, "td")).collect();
        if cells.len() < 4 {
            continue;
        }

        let company_cell = &cells[0];
        let mut company = company_cell
            .select(selector(&ANCHOR, "a"))
            .next()
            .map(|a| cell_text(&a))
            .unwrap_or_else(|| cell_text(company_cell));

        if company == CONTINUATION_MARKER {
            match &previous_company {
                Some(prev) => company = prev.clone(),
                None => continue,
            }
        }
        if company.is_empty() {
            continue;
        }
        previous_company = Some(company.clone());

        let title = cell_text(&cells[1]);
        let location = joined_text(&cells[2], ", ");
        let apply_link = apply_link(&cells[3]);

        let date_posted = date_index
            .and_then(|idx| cells.get(idx))
            .map(cell_text)
            .filter(|d| !d.is_empty());
        let days_since_posted = date_posted
            .as_deref()
            .and_then(|d| dates::parse_date_to_days(d, today));

        let description = generate_detailed_description(&company, &title, &location);
        let metadata = extract_listing_metadata(&title, &location, date_posted.as_deref());

        jobs.push(ScrapedJob {
            company,
            title,
            location,
            apply_link,
            job_requirements: description.clone(),
            description,
            source: GITHUB_SOURCE.to_string(),
            required_skills: Vec::new(),
            posted_on: days_since_posted.and_then(|d| dates::days_before(today, d)),
            days_since_posted,
            date_posted,
            metadata,
        });
    }

    info!("Parsed {} listings from README table", jobs.len());
    jobs
}

/// Synthesised description: base sentence, company or role paragraph, closing line.
pub fn generate_detailed_description(company: &str, role: &str, location: &str) -> String {
    let role_lower = role.to_lowercase();
    let company_lower = company.to_lowercase();

    let mut description =
        format!("Software Engineering internship at {company}. Role: {role}. Location: {location}. ");

    let company_context: Option<&str> = if company_lower.contains("bytedance")
        || company_lower.contains("tiktok")
    {
        description.push_str(
            "ByteDance is a global technology company known for TikTok and other popular apps. ",
        );
        Some(if role_lower.contains("frontend") {
            "This role focuses on frontend development for e-commerce platforms and user-facing applications. "
        } else if role_lower.contains("test") || contains_term(&role_lower, "sdet") {
            "This role focuses on quality assurance and automated testing for large-scale applications. "
        } else {
            "This role involves developing software for global e-commerce and social media platforms. "
        })
    } else if company_lower.contains("chase") || company_lower.contains("jpmorgan") {
        Some(
            "JPMorgan Chase is a leading global financial services firm. \
             This role involves developing software solutions for banking, financial services, and fintech applications. ",
        )
    } else if company_lower.contains("medtronic") {
        Some(
            "Medtronic is a global leader in medical technology. \
             This role involves developing software for life-saving medical devices and healthcare systems. ",
        )
    } else if contains_term(&company_lower, "kbr") {
        Some(
            "KBR is a global technology company specializing in defense, space, and technology solutions. \
             This role involves working with satellite systems, remote sensing data, and space technology. ",
        )
    } else if contains_term(&company_lower, "gdit") {
        Some(
            "GDIT is a technology company serving government and defense sectors. \
             This role involves developing software solutions for government agencies and defense contractors. ",
        )
    } else if contains_term(&company_lower, "sel") || company_lower.contains("schweitzer") {
        Some(
            "SEL is a leader in power systems and electrical engineering technology. \
             This role involves developing software for power grid management and electrical systems. ",
        )
    } else if company_lower.contains("tencent") {
        description.push_str(
            "Tencent is a global technology company known for gaming, social media, and cloud services. ",
        );
        Some(if role_lower.contains("cloud") || role_lower.contains("media") {
            "This role focuses on cloud computing and media processing technologies. "
        } else {
            "This role involves developing software for gaming, social media, and cloud platforms. "
        })
    } else {
        None
    };

    match company_context {
        Some(context) => description.push_str(context),
        None => description.push_str(role_paragraph(&role_lower)),
    }

    description.push_str(
        "This position is suitable for students and recent graduates with strong programming skills and a passion for technology.",
    );
    description
}

fn role_paragraph(role_lower: &str) -> &'static str {
    if role_lower.contains("frontend") {
        "This role focuses on frontend development with modern web technologies. \
         You'll build user interfaces and client-side applications using React, JavaScript, HTML, and CSS. "
    } else if role_lower.contains("backend") || contains_term(role_lower, "api") {
        "This role focuses on backend development and API development. \
         You'll work with databases, server-side logic, and building scalable backend systems. "
    } else if role_lower.contains("full stack") || role_lower.contains("fullstack") {
        "This role involves full stack development covering both frontend and backend technologies. \
         You'll work on complete web applications from database to user interface. "
    } else if role_lower.contains("test") || contains_term(role_lower, "qa") {
        "This role focuses on software testing and quality assurance. \
         You'll develop automated testing frameworks and ensure software quality. "
    } else if contains_term(role_lower, "ai") || role_lower.contains("machine learning") {
        "This role involves artificial intelligence and machine learning development. \
         You'll work on AI models, data processing, and intelligent software systems. "
    } else if role_lower.contains("data") {
        "This role focuses on data engineering and analysis. \
         You'll work with data pipelines, databases, and data processing systems. "
    } else {
        "This role involves general software engineering with programming, algorithms, and data structures. "
    }
}

/// Job type, level, work arrangement, sponsorship and age read off a row.
pub fn extract_listing_metadata(title: &str, location: &str, age: Option<&str>) -> ListingMetadata {
    let title_lower = title.to_lowercase();
    let location_lower = location.to_lowercase();

    let job_type = if title_lower.contains("co-op") || title_lower.contains("coop") {
        JobType::CoOp
    } else if title_lower.contains("intern") {
        JobType::Internship
    } else if title_lower.contains("program") {
        JobType::Program
    } else if title_lower.contains("associate") {
        JobType::Associate
    } else {
        JobType::Internship
    };

    let experience_level = if ["senior", "lead", "principal", "staff"]
        .iter()
        .any(|w| contains_term(&title_lower, w))
    {
        ListingLevel::Senior
    } else {
        ListingLevel::EntryLevel
    };

    let location_type = if location_lower.contains("remote") {
        LocationType::Remote
    } else if location_lower.contains("hybrid") {
        LocationType::Hybrid
    } else {
        LocationType::OnSite
    };

    let sponsorship = if title.contains('🛂') {
        Sponsorship::NoSponsorship
    } else if title.contains("🇺🇸") {
        Sponsorship::UsCitizenshipRequired
    } else {
        Sponsorship::Unknown
    };

    let age = age.map(str::trim).filter(|a| !a.is_empty() && *a != "Unknown");

    ListingMetadata {
        job_type,
        experience_level,
        location_type,
        deadline: age.and_then(deadline_from_age),
        sponsorship,
        salary_range: None,
        application_age: age.map(str::to_string),
    }
}

/// "5d" becomes "Posted 5 days ago"; unrecognised ages are echoed back.
fn deadline_from_age(age: &str) -> Option<String> {
    let (number, unit) = if age.contains('d') {
        (age.replace('d', ""), "days")
    } else if age.contains("mo") {
        (age.replace("mo", ""), "months")
    } else if age.contains('w') {
        (age.replace('w', ""), "weeks")
    } else {
        return None;
    };

    match number.trim().parse::<i64>() {
        Ok(n) => Some(format!("Posted {n} {unit} ago")),
        Err(_) => Some(age.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 21).unwrap()
    }

    const README: &str = r#"# Summer 2026 Tech Internships

Some intro text with a [link](https://example.com).

<table>
<thead>
<tr><th>Company</th><th>Role</th><th>Location</th><th>Application</th><th>Age</th></tr>
</thead>
<tbody>
<tr>
<td><strong><a href="https://simplify.jobs/c/Acme">Acme</a></strong></td>
<td>Software Engineer Intern 🛂</td>
<td>New York, NY</td>
<td><div align="center"><a href="https://simplify.jobs/p/abc"><img alt="Simplify"></a> <a href="https://careers.acme.com/jobs/1?utm_source=Simplify"><img alt="Apply"></a></div></td>
<td>3d</td>
</tr>
<tr>
<td>↳</td>
<td>Data Science Intern</td>
<td><details><summary>2 locations</summary>Austin, TX</br>Remote in USA</details></td>
<td><a href="https://simplify.jobs/p/def"><img alt="Simplify"></a></td>
<td>1mo</td>
</tr>
<tr>
<td>Initech</td>
<td>Frontend Co-op</td>
<td>Remote</td>
<td>🔒</td>
<td>Oct 01</td>
</tr>
<tr>
<td>Broken row</td>
<td>Only two cells</td>
</tr>
</tbody>
</table>

<table><tr><th>Company</th></tr><tr><td>Second table is ignored</td></tr></table>
"#;

    #[test]
    fn test_parses_rows_from_first_table() {
        let jobs = parse_internship_table(README, 100, today());
        assert_eq!(jobs.len(), 3);

        let acme = &jobs[0];
        assert_eq!(acme.company, "Acme");
        assert_eq!(acme.title, "Software Engineer Intern 🛂");
        assert_eq!(acme.location, "New York, NY");
        assert_eq!(acme.apply_link, "https://careers.acme.com/jobs/1?utm_source=Simplify");
        assert_eq!(acme.date_posted.as_deref(), Some("3d"));
        assert_eq!(acme.days_since_posted, Some(3));
        assert_eq!(acme.posted_on, NaiveDate::from_ymd_opt(2025, 10, 18));
        assert_eq!(acme.source, GITHUB_SOURCE);
        assert_eq!(acme.metadata.sponsorship, Sponsorship::NoSponsorship);
        assert_eq!(acme.metadata.deadline.as_deref(), Some("Posted 3 days ago"));
        assert!(acme.required_skills.is_empty());
    }

    #[test]
    fn test_continuation_row_inherits_company() {
        let jobs = parse_internship_table(README, 100, today());
        let data = &jobs[1];
        assert_eq!(data.company, "Acme");
        assert_eq!(data.location, "2 locations, Austin, TX, Remote in USA");
        assert_eq!(data.metadata.location_type, LocationType::Remote);
        // only a Simplify link is present, so it is used
        assert_eq!(data.apply_link, "https://simplify.jobs/p/def");
        assert_eq!(data.days_since_posted, Some(30));
    }

    #[test]
    fn test_missing_link_falls_back_to_hash() {
        let jobs = parse_internship_table(README, 100, today());
        let initech = &jobs[2];
        assert_eq!(initech.apply_link, "#");
        assert_eq!(initech.metadata.job_type, JobType::CoOp);
        assert_eq!(initech.days_since_posted, Some(20));
    }

    #[test]
    fn test_oversized_age_cell_leaves_age_unknown() {
        let readme = "<table>\
            <tr><th>Company</th><th>Role</th><th>Location</th><th>Application</th><th>Age</th></tr>\
            <tr><td>Acme</td><td>SWE Intern</td><td>NYC</td>\
            <td><a href=\"https://acme.com/apply\">Apply</a></td><td>99999999999d</td></tr>\
            </table>";
        let jobs = parse_internship_table(readme, 10, today());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].date_posted.as_deref(), Some("99999999999d"));
        assert_eq!(jobs[0].days_since_posted, None);
        assert_eq!(jobs[0].posted_on, None);
    }

    #[test]
    fn test_max_results_truncates() {
        assert_eq!(parse_internship_table(README, 2, today()).len(), 2);
    }

    #[test]
    fn test_no_table_yields_nothing() {
        assert!(parse_internship_table("# just markdown", 10, today()).is_empty());
    }

    #[test]
    fn test_description_uses_company_context() {
        let text = generate_detailed_description("JPMorgan Chase", "SWE Program", "NYC");
        assert!(text.starts_with("Software Engineering internship at JPMorgan Chase. Role: SWE Program."));
        assert!(text.contains("leading global financial services firm"));
        assert!(text.ends_with("a passion for technology."));
    }

    #[test]
    fn test_description_role_paragraph_for_unknown_company() {
        let text = generate_detailed_description("Acme", "Backend Engineer Intern", "NYC");
        assert!(text.contains("backend development and API development"));

        let selective = generate_detailed_description("Selective Insurance", "Intern", "NJ");
        assert!(!selective.contains("power systems"));
    }

    #[test]
    fn test_listing_metadata_markers() {
        let meta = extract_listing_metadata("Senior Staff Intern 🇺🇸", "Hybrid - Boston", Some("2w"));
        assert_eq!(meta.experience_level, ListingLevel::Senior);
        assert_eq!(meta.location_type, LocationType::Hybrid);
        assert_eq!(meta.sponsorship, Sponsorship::UsCitizenshipRequired);
        assert_eq!(meta.deadline.as_deref(), Some("Posted 2 weeks ago"));
        assert_eq!(meta.application_age.as_deref(), Some("2w"));
    }

    #[tokio::test]
    async fn test_fetch_readme_maps_status_errors() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/README.md")
            .with_status(200)
            .with_body(README)
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/missing.md")
            .with_status(404)
            .create_async()
            .await;

        let client = Client::new();
        let body = fetch_readme(&client, &format!("{}/README.md", server.url()))
            .await
            .unwrap();
        assert!(body.contains("<table>"));

        let err = fetch_readme(&client, &format!("{}/missing.md", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }
}
