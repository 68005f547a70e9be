// LLM prompt constants for candidate profiling and deep ranking.

pub const PROFILE_PERSONA: &str = "You are an expert career counselor and technical recruiter \
    who understands candidate potential and job fit.";

/// Replace `{skills}` and `{resume_text}` before sending.
pub const PROFILE_PROMPT_TEMPLATE: &str = r#"Analyze this candidate's profile and summarize it for internship matching.

Candidate information:
Skills: {skills}
Resume text:
{resume_text}

Extract:
1. The 8-10 strongest technical skills, most relevant first
2. Experience level (student, recent_graduate, entry_level, experienced)
3. Career direction (frontend, backend, fullstack, data, mobile, etc.)
4. Specialization areas
5. Learning style and adaptability indicators
6. Leadership or collaboration potential
7. Industry preferences, if any
8. Work style preferences (startup vs big tech, remote vs office)
9. Growth potential and trajectory

Return a JSON object with this EXACT schema:
{
  "top_skills": ["Python", "React", "SQL"],
  "experience_level": "student",
  "career_direction": "fullstack",
  "specialization_areas": ["web development", "backend apis"],
  "learning_indicators": "strong self-learner, enjoys new technologies",
  "leadership_potential": "medium",
  "adaptability_score": "high",
  "preferred_industries": ["technology"],
  "work_style": "collaborative, prefers hands-on learning",
  "growth_trajectory": "rapid learner with strong fundamentals",
  "confidence_level": "high|medium|low"
}"#;

pub const RANKING_PERSONA: &str = "You are a senior career counselor and technical recruiter \
    with a deep understanding of career development and job fit.";

/// Replace `{candidate}`, `{jobs}` and `{limit}` before sending.
pub const RANKING_PROMPT_TEMPLATE: &str = r#"Rank these internship opportunities for the BEST CAREER FIT for this candidate.

Candidate profile:
{candidate}

Job opportunities:
{jobs}

Ranking criteria:
1. Skill alignment and transferability
2. Growth and learning opportunities
3. Career trajectory fit
4. Company culture compatibility
5. Role progression potential
6. Learning curve appropriateness
7. Long-term career impact

Focus on compatibility and growth, not just skill overlap. Return the top {limit} jobs,
best first, as a JSON object with this EXACT schema:
{
  "rankings": [
    {
      "job_index": 1,
      "compatibility_score": 95,
      "reasoning": "Strong skill match with excellent growth opportunities",
      "growth_potential": "high",
      "skill_development": "React, advanced JS patterns",
      "career_impact": "strong foundation for a fullstack career"
    }
  ],
  "overall_analysis": "One paragraph on where this candidate fits best"
}

job_index refers to the numbered list above."#;
