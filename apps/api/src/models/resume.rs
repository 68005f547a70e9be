use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Student,
    Junior,
    Mid,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    Phd,
    Masters,
    Bachelors,
    Associate,
    #[default]
    Undergraduate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Citizenship {
    UsCitizen,
    PermanentResident,
    International,
    #[default]
    Unknown,
}

/// Signals read from the resume text that feed the metadata score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResumeMetadata {
    pub experience_level: ExperienceLevel,
    pub education_level: EducationLevel,
    pub location_preferences: Vec<String>,
    pub industry_preferences: Vec<String>,
    pub remote_preference: bool,
    pub relocation_willingness: bool,
    pub graduation_year: Option<u16>,
    pub gpa: Option<f32>,
    pub citizenship: Citizenship,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedResume {
    pub filename: String,
    #[serde(skip_serializing, default)]
    pub text: String,
    pub skills: Vec<String>,
    pub metadata: ResumeMetadata,
    /// S3 key of the archived upload, when archival is enabled.
    pub storage_key: Option<String>,
}
