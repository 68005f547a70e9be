use serde::Serialize;

/// Skills that name the same capability.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["javascript", "js", "ecmascript"],
    &["typescript", "ts"],
    &["python", "python3", "py"],
    &["machine learning", "ml", "ai", "artificial intelligence"],
    &["react", "reactjs", "react.js"],
    &["node.js", "nodejs", "node"],
    &["sql", "mysql", "postgresql", "postgres"],
    &["git", "github", "version control"],
    &["aws", "amazon web services"],
    &["docker", "containerization"],
];

pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillMatch {
    pub job_skill: String,
    pub resume_skill: String,
    pub similarity_score: f32,
}

/// String-level similarity between two skill names:
/// 1.0 exact, 0.95 synonyms, 0.8 containment, else 0.
pub fn fast_similarity(a: &str, b: &str) -> f32 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return 1.0;
    }

    let synonyms = SYNONYM_GROUPS
        .iter()
        .any(|group| group.contains(&a.as_str()) && group.contains(&b.as_str()));
    if synonyms {
        return 0.95;
    }

    if a.len() > 3 && b.len() > 3 && (a.contains(&b) || b.contains(&a)) {
        return 0.8;
    }

    0.0
}

/// For each job skill, the best resume skill at or above `threshold`.
pub fn match_skills<J, R>(job_skills: &[J], resume_skills: &[R], threshold: f32) -> Vec<SkillMatch>
where
    J: AsRef<str>,
    R: AsRef<str>,
{
    let mut matches = Vec::new();

    for job_skill in job_skills {
        let job_skill = job_skill.as_ref();
        let mut best: Option<(&str, f32)> = None;

        for resume_skill in resume_skills {
            let resume_skill = resume_skill.as_ref();
            let score = fast_similarity(job_skill, resume_skill);
            if score >= 1.0 {
                best = Some((resume_skill, 1.0));
                break;
            }
            if score >= threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((resume_skill, score));
            }
        }

        if let Some((resume_skill, similarity_score)) = best {
            matches.push(SkillMatch {
                job_skill: job_skill.to_string(),
                resume_skill: resume_skill.to_string(),
                similarity_score,
            });
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_similarity_levels() {
        assert_eq!(fast_similarity("Python", " python "), 1.0);
        assert_eq!(fast_similarity("JavaScript", "JS"), 0.95);
        assert_eq!(fast_similarity("SQL", "PostgreSQL"), 0.95);
        assert_eq!(fast_similarity("Machine Learning", "Machine Learning Ops"), 0.8);
        assert_eq!(fast_similarity("Go", "Google"), 0.0);
        assert_eq!(fast_similarity("Rust", "Java"), 0.0);
    }

    #[test]
    fn test_match_skills_prefers_exact_match() {
        let matches = match_skills(&["React"], &["React.js", "react"], DEFAULT_MATCH_THRESHOLD);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].resume_skill, "react");
        assert_eq!(matches[0].similarity_score, 1.0);
    }

    #[test]
    fn test_match_skills_applies_threshold() {
        let job = ["Data Analysis", "Kubernetes"];
        let resume = ["data analysis tools", "Docker"];
        assert_eq!(match_skills(&job, &resume, 0.7).len(), 1);
        assert!(match_skills(&job, &resume, 0.9).is_empty());
    }
}
