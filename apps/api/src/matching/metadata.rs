//! Job requirement heuristics and the resume/job metadata compatibility score.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::models::job::{Job, ListingLevel, LocationType, Sponsorship};
use crate::models::resume::{Citizenship, ExperienceLevel, ResumeMetadata};
use crate::skills::inference::contains_term;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobLevel {
    Intern,
    Junior,
    Mid,
    Senior,
    #[default]
    Entry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EducationRequirement {
    Phd,
    Masters,
    #[default]
    Bachelors,
    HighSchool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CitizenshipRequirement {
    UsCitizen,
    PermanentResident,
    #[default]
    Any,
}

/// What a listing asks of a candidate, as far as its text reveals.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct JobRequirementsProfile {
    pub location: String,
    pub experience_level: JobLevel,
    pub education_required: EducationRequirement,
    pub remote_option: bool,
    pub relocation_assistance: bool,
    pub industry: Option<String>,
    pub citizenship_requirement: CitizenshipRequirement,
    pub start_date: Option<String>,
    pub duration: Option<String>,
}

/// Checked in order; the first level with any hit wins.
const LEVEL_INDICATORS: &[(JobLevel, &[&str])] = &[
    (
        JobLevel::Senior,
        &["senior", "lead", "principal", "staff", "architect", "manager"],
    ),
    (
        JobLevel::Mid,
        &["mid-level", "intermediate", "3+ years", "5+ years"],
    ),
    (
        JobLevel::Junior,
        &["junior", "entry-level", "0-2 years", "recent graduate"],
    ),
    (JobLevel::Intern, &["intern", "internship", "co-op", "student"]),
];

/// Checked in order; the last requirement with any hit wins.
const EDUCATION_INDICATORS: &[(EducationRequirement, &[&str])] = &[
    (EducationRequirement::Phd, &["phd", "ph.d", "doctorate", "doctoral"]),
    (EducationRequirement::Masters, &["masters", "master's", "ms", "mba"]),
    (
        EducationRequirement::Bachelors,
        &["bachelors", "bachelor's", "bs", "ba", "degree"],
    ),
    (EducationRequirement::HighSchool, &["high school", "diploma"]),
];

/// Checked in order; the last industry with any hit wins.
const INDUSTRY_INDICATORS: &[(&str, &[&str])] = &[
    ("tech", &["software", "technology", "tech", "programming"]),
    ("finance", &["finance", "financial", "banking", "investment", "trading"]),
    ("healthcare", &["healthcare", "medical", "pharmaceutical"]),
    ("e-commerce", &["e-commerce", "retail", "shopping"]),
    ("ai", &["ai", "artificial intelligence", "machine learning"]),
    ("data", &["data science", "analytics", "big data"]),
    ("cybersecurity", &["security", "cybersecurity", "infosec"]),
    ("cloud", &["cloud", "aws", "azure", "gcp"]),
    ("mobile", &["mobile", "ios", "android"]),
    ("web", &["web", "frontend", "backend", "full-stack"]),
];

const REMOTE_INDICATORS: &[&str] = &["remote", "virtual", "work from home"];
const RELOCATION_INDICATORS: &[&str] =
    &["relocation assistance", "relocation package", "help with relocation"];

/// Checked in order; the last requirement with any hit wins.
const CITIZENSHIP_INDICATORS: &[(CitizenshipRequirement, &[&str])] = &[
    (
        CitizenshipRequirement::UsCitizen,
        &["us citizen", "u.s. citizen", "american citizen", "citizenship required"],
    ),
    (
        CitizenshipRequirement::PermanentResident,
        &["permanent resident", "green card"],
    ),
    (
        CitizenshipRequirement::Any,
        &["international welcome", "international students welcome"],
    ),
];

fn any_term(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| contains_term(text, t))
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

fn location_from_description(description: &str) -> Option<String> {
    static LABELLED: OnceLock<Regex> = OnceLock::new();
    static BASED_IN: OnceLock<Regex> = OnceLock::new();

    [
        regex(&LABELLED, r"location[:\s]+([^,.\n]+)"),
        regex(&BASED_IN, r"based in ([^,.\n]+)"),
    ]
    .iter()
    .find_map(|re| re.captures(description).map(|c| c[1].trim().to_string()))
    .filter(|l| !l.is_empty())
}

fn start_date(description: &str) -> Option<String> {
    static SEASON: OnceLock<Regex> = OnceLock::new();
    regex(&SEASON, r"\b(summer|fall|spring|winter) (20\d{2})\b")
        .captures(description)
        .map(|c| format!("{} {}", &c[1], &c[2]))
}

fn duration(description: &str) -> Option<String> {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    regex(&SPAN, r"\b(\d{1,2}) (months|weeks)\b")
        .captures(description)
        .map(|c| format!("{} {}", &c[1], &c[2]))
}

/// Requirement profile of a listing: structured listing fields first,
/// then keyword heuristics over title and description.
pub fn extract_job_requirements(job: &Job) -> JobRequirementsProfile {
    let title = job.title.to_lowercase();
    let description = job.description.to_lowercase();
    let both = format!("{title}\n{description}");
    let mut profile = JobRequirementsProfile::default();

    let location = job.location.trim();
    profile.location = if location.is_empty() {
        location_from_description(&description).unwrap_or_default()
    } else {
        location.to_string()
    };
    profile.remote_option = job.metadata.location_type == LocationType::Remote
        || any_term(&location.to_lowercase(), REMOTE_INDICATORS)
        || any_term(&description, REMOTE_INDICATORS);

    profile.experience_level = if job.metadata.experience_level == ListingLevel::Senior {
        JobLevel::Senior
    } else {
        LEVEL_INDICATORS
            .iter()
            .find(|(_, indicators)| any_term(&both, indicators))
            .map(|(level, _)| *level)
            .unwrap_or_default()
    };

    for (requirement, indicators) in EDUCATION_INDICATORS {
        if any_term(&description, indicators) {
            profile.education_required = *requirement;
        }
    }

    for (industry, indicators) in INDUSTRY_INDICATORS {
        if any_term(&both, indicators) {
            profile.industry = Some(industry.to_string());
        }
    }

    profile.relocation_assistance = RELOCATION_INDICATORS.iter().any(|i| description.contains(i));

    profile.citizenship_requirement = match job.metadata.sponsorship {
        Sponsorship::UsCitizenshipRequired => CitizenshipRequirement::UsCitizen,
        Sponsorship::NoSponsorship => CitizenshipRequirement::PermanentResident,
        Sponsorship::Unknown => {
            let mut requirement = CitizenshipRequirement::Any;
            for (candidate, indicators) in CITIZENSHIP_INDICATORS {
                if any_term(&description, indicators) {
                    requirement = *candidate;
                }
            }
            requirement
        }
    };

    profile.start_date = start_date(&description);
    profile.duration = duration(&description);
    profile
}

fn experience_score(resume: ExperienceLevel, job: JobLevel) -> u32 {
    use ExperienceLevel as R;
    use JobLevel as J;
    match (resume, job) {
        (R::Student, J::Intern) => 100,
        (R::Student, J::Junior) => 80,
        (R::Student, J::Mid) => 40,
        (R::Student, J::Senior) => 0,
        (R::Junior, J::Intern) => 60,
        (R::Junior, J::Junior) => 100,
        (R::Junior, J::Mid) => 80,
        (R::Junior, J::Senior) => 40,
        (R::Mid, J::Intern) => 20,
        (R::Mid, J::Junior) => 60,
        (R::Mid, J::Mid) => 100,
        (R::Mid, J::Senior) => 80,
        (R::Senior, J::Intern) => 0,
        (R::Senior, J::Junior) => 20,
        (R::Senior, J::Mid) => 60,
        (R::Senior, J::Senior) => 100,
        (_, J::Entry) => 50,
    }
}

fn citizenship_score(resume: Citizenship, job: CitizenshipRequirement) -> u32 {
    use Citizenship as R;
    use CitizenshipRequirement as J;
    match (resume, job) {
        (R::Unknown, _) => 70,
        (_, J::Any) => 100,
        (R::UsCitizen, _) => 100,
        (R::PermanentResident, J::UsCitizen) => 80,
        (R::PermanentResident, J::PermanentResident) => 100,
        (R::International, _) => 0,
    }
}

fn overlaps(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    a.contains(&b) || b.contains(&a)
}

/// Weighted compatibility (experience 40 %, location 25 %, industry 20 %,
/// citizenship 15 %) with one explanation line per factor.
pub fn metadata_match_score(resume: &ResumeMetadata, job: &JobRequirementsProfile) -> (u32, String) {
    let mut lines = Vec::with_capacity(4);

    let experience = experience_score(resume.experience_level, job.experience_level);
    lines.push(match experience {
        80.. => "Experience level matches well",
        60..=79 => "Experience level is acceptable",
        40..=59 => "Experience level may be challenging",
        _ => "Experience level mismatch",
    });

    let location = if job.remote_option && resume.remote_preference {
        lines.push("Remote work preference matches");
        100
    } else if job.remote_option {
        lines.push("Job offers remote option");
        80
    } else if resume.remote_preference {
        lines.push("You prefer remote but job is on-site");
        60
    } else if !resume.location_preferences.is_empty() && !job.location.is_empty() {
        if resume
            .location_preferences
            .iter()
            .any(|pref| overlaps(pref, &job.location))
        {
            lines.push("Location preference matches");
            100
        } else {
            lines.push("Location preferences don't match");
            50
        }
    } else {
        lines.push("Location compatibility unclear");
        70
    };

    let industry = match &job.industry {
        Some(industry) if !resume.industry_preferences.is_empty() => {
            if resume
                .industry_preferences
                .iter()
                .any(|pref| overlaps(pref, industry))
            {
                lines.push("Industry preference matches");
                100
            } else {
                lines.push("Industry preferences don't match");
                60
            }
        }
        _ => {
            lines.push("Industry compatibility unclear");
            70
        }
    };

    let citizenship = citizenship_score(resume.citizenship, job.citizenship_requirement);
    lines.push(match citizenship {
        80.. => "Citizenship/visa requirements compatible",
        60..=79 => "Citizenship/visa requirements may be challenging",
        _ => "Citizenship/visa requirements incompatible",
    });

    let score = experience as f64 * 0.40
        + location as f64 * 0.25
        + industry as f64 * 0.20
        + citizenship as f64 * 0.15;

    (round_score(score), lines.join("\n"))
}

/// 70 % skills, 30 % metadata.
pub fn combine_scores(skill_score: u32, metadata_score: u32) -> u32 {
    round_score(skill_score as f64 * 0.7 + metadata_score as f64 * 0.3)
}

/// Halves round to the even neighbour, so 72.5 scores 72 and 73.5 scores 74.
fn round_score(score: f64) -> u32 {
    score.round_ties_even() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_scores_round_to_even() {
        assert_eq!(round_score(72.5), 72);
        assert_eq!(round_score(73.5), 74);
        assert_eq!(round_score(73.4), 73);
        assert_eq!(round_score(0.5), 0);
    }
    use crate::models::job::test_support::job;

    fn student() -> ResumeMetadata {
        ResumeMetadata::default()
    }

    #[test]
    fn test_generated_listing_reads_as_internship() {
        let mut listing = job(1, "Acme", "Backend Engineer Intern", &["Python"]);
        listing.description = "Software Engineering internship at Acme. Role: Backend Engineer Intern. \
            Location: New York, NY. Summer 2026, 12 weeks. US citizenship required."
            .to_string();

        let profile = extract_job_requirements(&listing);
        assert_eq!(profile.experience_level, JobLevel::Intern);
        assert_eq!(profile.location, "New York, NY");
        assert!(!profile.remote_option);
        assert_eq!(profile.industry.as_deref(), Some("web"));
        assert_eq!(profile.start_date.as_deref(), Some("summer 2026"));
        assert_eq!(profile.duration.as_deref(), Some("12 weeks"));
        assert_eq!(profile.citizenship_requirement, CitizenshipRequirement::UsCitizen);
    }

    #[test]
    fn test_listing_markers_take_precedence() {
        let mut listing = job(2, "Acme", "Software Engineer Intern", &[]);
        listing.metadata.sponsorship = Sponsorship::UsCitizenshipRequired;
        listing.metadata.location_type = LocationType::Remote;
        listing.metadata.experience_level = ListingLevel::Senior;

        let profile = extract_job_requirements(&listing);
        assert_eq!(profile.citizenship_requirement, CitizenshipRequirement::UsCitizen);
        assert!(profile.remote_option);
        assert_eq!(profile.experience_level, JobLevel::Senior);
    }

    #[test]
    fn test_senior_words_are_token_bounded() {
        let mut listing = job(3, "JPMorgan", "SWE Program", &[]);
        listing.description = "JPMorgan Chase is a leading global financial services firm.".to_string();
        let profile = extract_job_requirements(&listing);
        assert_eq!(profile.experience_level, JobLevel::Entry);
        assert_eq!(profile.industry.as_deref(), Some("finance"));
    }

    #[test]
    fn test_student_intern_scores_high() {
        let requirements = JobRequirementsProfile {
            experience_level: JobLevel::Intern,
            ..Default::default()
        };
        let (score, description) = metadata_match_score(&student(), &requirements);
        // 100*.4 + 70*.25 + 70*.2 + 70*.15
        assert_eq!(score, 82);
        assert!(description.starts_with("Experience level matches well"));
        assert_eq!(description.lines().count(), 4);
    }

    #[test]
    fn test_entry_level_listing_is_neutral_for_experience() {
        let (score, _) = metadata_match_score(&student(), &JobRequirementsProfile::default());
        // 50*.4 + 70*.25 + 70*.2 + 70*.15
        assert_eq!(score, 62);
    }

    #[test]
    fn test_international_candidate_against_citizen_only_role() {
        let resume = ResumeMetadata {
            citizenship: Citizenship::International,
            remote_preference: true,
            industry_preferences: vec!["finance".to_string()],
            ..Default::default()
        };
        let requirements = JobRequirementsProfile {
            experience_level: JobLevel::Intern,
            remote_option: true,
            industry: Some("finance".to_string()),
            citizenship_requirement: CitizenshipRequirement::UsCitizen,
            ..Default::default()
        };
        let (score, description) = metadata_match_score(&resume, &requirements);
        // 100*.4 + 100*.25 + 100*.2 + 0
        assert_eq!(score, 85);
        assert!(description.ends_with("Citizenship/visa requirements incompatible"));
    }

    #[test]
    fn test_combine_scores_weights_skills() {
        assert_eq!(combine_scores(100, 0), 70);
        assert_eq!(combine_scores(50, 82), 60);
        assert_eq!(combine_scores(0, 0), 0);
    }
}
