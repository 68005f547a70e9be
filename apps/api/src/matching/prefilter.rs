use crate::matching::metadata::{combine_scores, extract_job_requirements, metadata_match_score};
use crate::models::job::Job;
use crate::models::resume::ResumeMetadata;
use crate::skills::{match_skills, SkillMatch, DEFAULT_MATCH_THRESHOLD};

/// A job that survived the pre-filter, with its heuristic scores.
#[derive(Debug, Clone)]
pub struct ScoredJob {
    pub job: Job,
    pub skill_score: u32,
    pub metadata_score: u32,
    pub combined_score: u32,
    pub matched_skills: Vec<SkillMatch>,
    pub metadata_description: String,
}

/// Share of the job's skills covered by the resume, 0 to 100.
pub fn skill_score(job_skills: &[String], matched: usize) -> u32 {
    if job_skills.is_empty() {
        return 0;
    }
    (100.0 * matched as f64 / job_skills.len() as f64).round() as u32
}

pub fn score_job(job: Job, resume_skills: &[String], resume_metadata: &ResumeMetadata) -> ScoredJob {
    let matched_skills = match_skills(&job.required_skills, resume_skills, DEFAULT_MATCH_THRESHOLD);
    let skill_score = skill_score(&job.required_skills, matched_skills.len());
    let requirements = extract_job_requirements(&job);
    let (metadata_score, metadata_description) = metadata_match_score(resume_metadata, &requirements);

    ScoredJob {
        combined_score: combine_scores(skill_score, metadata_score),
        job,
        skill_score,
        metadata_score,
        matched_skills,
        metadata_description,
    }
}

/// Scores every job, drops those sharing no skill with the resume and keeps
/// the best `limit` by combined score. Ties go to company, then title.
pub fn prefilter(
    jobs: Vec<Job>,
    resume_skills: &[String],
    resume_metadata: &ResumeMetadata,
    limit: usize,
) -> Vec<ScoredJob> {
    let mut scored: Vec<ScoredJob> = jobs
        .into_iter()
        .map(|job| score_job(job, resume_skills, resume_metadata))
        .filter(|s| s.skill_score > 0)
        .collect();

    scored.sort_by(|a, b| {
        b.combined_score
            .cmp(&a.combined_score)
            .then_with(|| a.job.company.cmp(&b.job.company))
            .then_with(|| a.job.title.cmp(&b.job.title))
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::test_support::job;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_skill_score_is_share_of_job_skills() {
        assert_eq!(skill_score(&skills(&["Python", "SQL", "Go"]), 2), 67);
        assert_eq!(skill_score(&[], 0), 0);
    }

    #[test]
    fn test_prefilter_drops_unrelated_and_orders() {
        let resume = skills(&["Python", "SQL"]);
        let jobs = vec![
            job(1, "Zeta", "Data Intern", &["Python", "SQL"]),
            job(2, "Acme", "Data Intern", &["Python", "SQL"]),
            job(3, "Beta", "iOS Intern", &["Swift", "Xcode"]),
            job(4, "Gamma", "Backend Intern", &["Python", "Java", "Go", "Rust"]),
            job(5, "Empty", "Mystery Intern", &[]),
        ];

        let kept = prefilter(jobs, &resume, &ResumeMetadata::default(), 10);
        let ids: Vec<i64> = kept.iter().map(|s| s.job.id).collect();

        assert_eq!(ids, vec![2, 1, 4]);
        assert_eq!(kept[0].skill_score, 100);
        assert_eq!(kept[2].skill_score, 25);
        assert!(kept.windows(2).all(|w| w[0].combined_score >= w[1].combined_score));
    }

    #[test]
    fn test_prefilter_truncates_to_limit() {
        let resume = skills(&["Python"]);
        let jobs = (1..=5)
            .map(|i| job(i, &format!("Co{i}"), "Intern", &["Python"]))
            .collect();
        assert_eq!(prefilter(jobs, &resume, &ResumeMetadata::default(), 3).len(), 3);
    }
}
