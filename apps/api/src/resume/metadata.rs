//! Heuristic candidate metadata read from resume text.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::resume::{Citizenship, EducationLevel, ExperienceLevel, ResumeMetadata};
use crate::skills::inference::contains_term;

/// Checked in order; the last level with any hit wins.
const EXPERIENCE_INDICATORS: &[(ExperienceLevel, &[&str])] = &[
    (
        ExperienceLevel::Senior,
        &["senior", "lead", "principal", "staff", "architect", "manager"],
    ),
    (
        ExperienceLevel::Mid,
        &["mid-level", "intermediate", "3+ years", "5+ years"],
    ),
    (
        ExperienceLevel::Junior,
        &["junior", "entry-level", "0-2 years", "recent graduate"],
    ),
    (
        ExperienceLevel::Student,
        &["student", "intern", "internship", "co-op", "undergraduate", "graduate"],
    ),
];

/// Highest degree first.
const EDUCATION_INDICATORS: &[(EducationLevel, &[&str])] = &[
    (EducationLevel::Phd, &["phd", "ph.d", "doctorate", "doctoral"]),
    (
        EducationLevel::Masters,
        &["masters", "master's", "ms", "m.s", "ma", "mba"],
    ),
    (
        EducationLevel::Bachelors,
        &["bachelors", "bachelor's", "bs", "b.s", "ba", "undergraduate"],
    ),
    (EducationLevel::Associate, &["associate's", "associate degree"]),
];

const INDUSTRY_KEYWORDS: &[&str] = &[
    "tech",
    "software",
    "finance",
    "healthcare",
    "e-commerce",
    "ai",
    "machine learning",
    "data science",
    "cybersecurity",
    "cloud",
    "mobile",
    "web",
    "gaming",
    "automotive",
];

const REMOTE_INDICATORS: &[&str] = &["remote", "work from home", "wfh", "virtual", "online"];
const RELOCATION_INDICATORS: &[&str] = &["willing to relocate", "open to relocation", "can relocate"];

/// Checked in order; the last status with any hit wins.
const CITIZENSHIP_INDICATORS: &[(Citizenship, &[&str])] = &[
    (
        Citizenship::UsCitizen,
        &["us citizen", "u.s. citizen", "american citizen", "citizen"],
    ),
    (
        Citizenship::PermanentResident,
        &["permanent resident", "green card"],
    ),
    (
        Citizenship::International,
        &["international student", "f1 visa", "f-1 visa", "h1b", "visa sponsorship"],
    ),
];

fn location_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"location[:\s]+([^,\n]+)",
            r"based in ([^,\n]+)",
            r"willing to relocate to ([^,\n]+)",
            r"prefer ([^,\n]+) area",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn any_term(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| contains_term(text, t))
}

fn graduation_year(text: &str) -> Option<u16> {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"\b(20\d{2})\b").unwrap())
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u16>().ok())
        .max()
}

fn gpa(text: &str) -> Option<f32> {
    static GPA: OnceLock<Regex> = OnceLock::new();
    GPA.get_or_init(|| Regex::new(r"gpa[:\s]*(\d+\.\d+)").unwrap())
        .captures(text)
        .and_then(|c| c[1].parse::<f32>().ok())
}

/// Experience, education, preferences and status signals from a resume.
///
/// `_skills` is accepted for parity with the job-side extractor; every
/// signal currently comes from the text.
pub fn extract_resume_metadata(_skills: &[String], text: &str) -> ResumeMetadata {
    let text = text.to_lowercase();
    let mut metadata = ResumeMetadata::default();

    for (level, indicators) in EXPERIENCE_INDICATORS {
        if any_term(&text, indicators) {
            metadata.experience_level = *level;
        }
    }

    if let Some((level, _)) = EDUCATION_INDICATORS
        .iter()
        .find(|(_, indicators)| any_term(&text, indicators))
    {
        metadata.education_level = *level;
    }

    for pattern in location_patterns() {
        for capture in pattern.captures_iter(&text) {
            let place = capture[1].trim();
            if !place.is_empty() && !metadata.location_preferences.iter().any(|p| p == place) {
                metadata.location_preferences.push(place.to_string());
            }
        }
    }

    metadata.industry_preferences = INDUSTRY_KEYWORDS
        .iter()
        .filter(|k| contains_term(&text, k))
        .map(|k| k.to_string())
        .collect();

    metadata.remote_preference = any_term(&text, REMOTE_INDICATORS);
    metadata.relocation_willingness = RELOCATION_INDICATORS.iter().any(|i| text.contains(i));
    metadata.graduation_year = graduation_year(&text);
    metadata.gpa = gpa(&text);

    for (status, indicators) in CITIZENSHIP_INDICATORS {
        if any_term(&text, indicators) {
            metadata.citizenship = *status;
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\nLocation: Austin, TX\nB.S. Computer Science, University of Texas, GPA: 3.85\n\
        Expected graduation May 2026. Software Engineering Intern at Acme (2024).\n\
        Built machine learning pipelines and web dashboards. US citizen. Open to relocation.";

    #[test]
    fn test_typical_student_resume() {
        let meta = extract_resume_metadata(&[], RESUME);
        assert_eq!(meta.experience_level, ExperienceLevel::Student);
        assert_eq!(meta.education_level, EducationLevel::Bachelors);
        assert_eq!(meta.location_preferences, vec!["austin"]);
        assert_eq!(meta.graduation_year, Some(2026));
        assert_eq!(meta.gpa, Some(3.85));
        assert_eq!(meta.citizenship, Citizenship::UsCitizen);
        assert!(meta.relocation_willingness);
        assert!(!meta.remote_preference);
        assert_eq!(
            meta.industry_preferences,
            vec!["software", "machine learning", "web"]
        );
    }

    #[test]
    fn test_highest_degree_wins() {
        let meta = extract_resume_metadata(&[], "M.S. in Data Science, BS in Math, PhD candidate");
        assert_eq!(meta.education_level, EducationLevel::Phd);
    }

    #[test]
    fn test_short_tokens_need_word_boundaries() {
        // "ms" inside "systems", "ai" inside "maintained"
        let meta = extract_resume_metadata(&[], "Maintained distributed systems.");
        assert_eq!(meta.education_level, EducationLevel::Undergraduate);
        assert!(meta.industry_preferences.is_empty());
    }

    #[test]
    fn test_later_experience_group_overrides() {
        let meta = extract_resume_metadata(&[], "Team lead for a student robotics club");
        assert_eq!(meta.experience_level, ExperienceLevel::Student);

        let meta = extract_resume_metadata(&[], "Senior engineer, 5+ years");
        assert_eq!(meta.experience_level, ExperienceLevel::Mid);
    }

    #[test]
    fn test_international_status_overrides_citizen_mention() {
        let meta = extract_resume_metadata(&[], "Not a US citizen; international student on F1 visa.");
        assert_eq!(meta.citizenship, Citizenship::International);
    }

    #[test]
    fn test_empty_text_uses_defaults() {
        assert_eq!(extract_resume_metadata(&[], ""), ResumeMetadata::default());
    }
}
