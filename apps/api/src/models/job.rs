use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const GITHUB_SOURCE: &str = "github_internships";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JobType {
    #[default]
    Internship,
    #[serde(rename = "Co-op")]
    CoOp,
    Program,
    Associate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ListingLevel {
    #[default]
    #[serde(rename = "Entry-level")]
    EntryLevel,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LocationType {
    Remote,
    Hybrid,
    #[default]
    #[serde(rename = "On-site")]
    OnSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Sponsorship {
    #[serde(rename = "No Sponsorship")]
    NoSponsorship,
    #[serde(rename = "US Citizenship Required")]
    UsCitizenshipRequired,
    #[default]
    Unknown,
}

/// Facts read off a README row: markers, title words and the age column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ListingMetadata {
    pub job_type: JobType,
    pub experience_level: ListingLevel,
    pub location_type: LocationType,
    pub deadline: Option<String>,
    pub sponsorship: Sponsorship,
    pub salary_range: Option<String>,
    pub application_age: Option<String>,
}

/// A listing freshly parsed from the README, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedJob {
    pub company: String,
    pub title: String,
    pub location: String,
    pub apply_link: String,
    pub description: String,
    pub job_requirements: String,
    pub source: String,
    pub required_skills: Vec<String>,
    /// Raw text of the date column.
    pub date_posted: Option<String>,
    pub days_since_posted: Option<i64>,
    pub posted_on: Option<NaiveDate>,
    pub metadata: ListingMetadata,
}

/// A persisted listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub job_hash: String,
    pub company: String,
    pub title: String,
    pub location: String,
    pub apply_link: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub job_requirements: String,
    pub source: String,
    pub metadata: ListingMetadata,
    pub date_posted: Option<String>,
    pub posted_on: Option<NaiveDate>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub is_active: bool,
}

/// Anything whose posting age can be worked out relative to `today`.
pub trait PostingAge {
    fn days_since_posted(&self, today: NaiveDate) -> Option<i64>;
}

impl PostingAge for ScrapedJob {
    fn days_since_posted(&self, today: NaiveDate) -> Option<i64> {
        match self.posted_on {
            Some(date) => Some((today - date).num_days().max(0)),
            None => self.days_since_posted,
        }
    }
}

impl PostingAge for Job {
    fn days_since_posted(&self, today: NaiveDate) -> Option<i64> {
        self.posted_on.map(|date| (today - date).num_days().max(0))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_metadata_serializes_display_names() {
        let metadata = ListingMetadata {
            job_type: JobType::CoOp,
            sponsorship: Sponsorship::NoSponsorship,
            ..Default::default()
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["job_type"], "Co-op");
        assert_eq!(value["experience_level"], "Entry-level");
        assert_eq!(value["location_type"], "On-site");
        assert_eq!(value["sponsorship"], "No Sponsorship");
    }

    #[test]
    fn test_listing_metadata_tolerates_missing_fields() {
        let metadata: ListingMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata, ListingMetadata::default());
    }

    #[test]
    fn test_days_since_posted_is_derived_from_posted_on() {
        let mut job = test_support::job(1, "Acme", "SWE Intern", &[]);
        let today = NaiveDate::from_ymd_opt(2025, 10, 21).unwrap();
        assert_eq!(job.days_since_posted(today), None);

        job.posted_on = NaiveDate::from_ymd_opt(2025, 10, 11);
        assert_eq!(job.days_since_posted(today), Some(10));
    }
}
