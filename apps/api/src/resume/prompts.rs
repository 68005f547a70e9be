// LLM prompt constants for resume skill extraction.

pub const RESUME_SKILLS_PERSONA: &str = "You are an experienced technical recruiter who reads \
    student and early-career resumes and lists the concrete skills they demonstrate.";

/// Replace `{resume_text}` before sending.
pub const RESUME_SKILLS_PROMPT_TEMPLATE: &str = r#"Extract the technical skills this candidate has from the resume below.

Rules:
- Include programming languages, frameworks, libraries, databases, cloud platforms and tools.
- Include technical domains the candidate has clearly worked in (e.g. "Machine Learning", "Data Analysis").
- Use the canonical name of each technology (e.g. "JavaScript", "PostgreSQL", "Node.js").
- Do NOT include soft skills, spoken languages, course names or company names.
- List each skill once.

Return a JSON object with this EXACT schema:
{
  "skills": ["skill1", "skill2"]
}

Resume:
{resume_text}"#;
