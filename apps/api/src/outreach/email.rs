use serde::Serialize;

use crate::models::job::Job;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// Job skills the applicant also lists, compared case-insensitively, in job order.
pub fn shared_skills<'a, S: AsRef<str>>(job_skills: &'a [String], resume_skills: &[S]) -> Vec<&'a str> {
    job_skills
        .iter()
        .filter(|skill| {
            resume_skills
                .iter()
                .any(|r| r.as_ref().trim().eq_ignore_ascii_case(skill.trim()))
        })
        .map(String::as_str)
        .collect()
}

/// Cover email for `job`. The skills sentence is left out when nothing overlaps.
pub fn generate_email<S: AsRef<str>>(job: &Job, resume_skills: &[S], applicant_name: &str) -> EmailDraft {
    let shared = shared_skills(&job.required_skills, resume_skills);

    let mut interest = format!(
        "I am writing to express my interest in the {} position.",
        job.title
    );
    if !shared.is_empty() {
        interest.push_str(&format!(
            " Based on the description, I believe my background aligns well with the role, \
             particularly my experience with {}.",
            shared.join(", ")
        ));
    }

    let body = format!(
        "Dear Hiring Team at {company},\n\n{interest}\n\n\
         I've attached my resume and would welcome the opportunity to contribute to \
         {company}'s team. Thank you for your consideration.\n\n\
         Best regards,\n{applicant_name}\n",
        company = job.company,
    );

    EmailDraft {
        subject: format!("Application for {} at {}", job.title, job.company),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::test_support::job;

    #[test]
    fn test_email_names_role_company_and_shared_skills() {
        let listing = job(1, "Acme", "Data Intern", &["Python", "SQL", "Spark"]);
        let draft = generate_email(&listing, &["sql", "python", "Go"], "Sam Lee");

        assert_eq!(draft.subject, "Application for Data Intern at Acme");
        assert!(draft.body.starts_with("Dear Hiring Team at Acme,"));
        assert!(draft.body.contains("the Data Intern position"));
        assert!(draft.body.contains("particularly my experience with Python, SQL."));
        assert!(draft.body.contains("contribute to Acme's team"));
        assert!(draft.body.trim_end().ends_with("Sam Lee"));
    }

    #[test]
    fn test_skills_sentence_omitted_without_overlap() {
        let listing = job(1, "Acme", "iOS Intern", &["Swift"]);
        let draft = generate_email(&listing, &["Python"], "Sam");
        assert!(!draft.body.contains("particularly my experience"));
    }
}
