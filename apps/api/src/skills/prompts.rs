// LLM prompt constants for job skill extraction.

pub const JOB_SKILLS_PERSONA: &str = "You are a technical recruiter who understands what skills \
    are needed for different software engineering roles. You infer specific technical \
    requirements from job titles and descriptions.";

/// Replace `{company}`, `{title}` and `{description}` before sending.
pub const JOB_SKILLS_PROMPT_TEMPLATE: &str = r#"Analyze this internship role and extract the SPECIFIC technical skills required.

Instructions:
1. The job title reveals the role's focus (Frontend, Backend, Mobile, Data, Security, etc.).
2. If the title names specific technologies (e.g. "React", "Python", "AWS"), ALWAYS include them.
3. Infer role-specific skills from the title:
   - Frontend: JavaScript, React/Angular/Vue, HTML, CSS, TypeScript
   - Backend: Python/Java/Go, SQL, API Development, Microservices
   - Full Stack: JavaScript, Python/Java, SQL, React, Backend, Frontend
   - Mobile: Swift, Kotlin, Java, Mobile Development, iOS/Android
   - Data Scientist/Analyst: Python, SQL, Data Analysis, Machine Learning, Statistics
   - Data Engineer: Python, SQL, ETL, Data Pipelines, Spark
   - DevOps/Cloud: AWS/Azure/GCP, Docker, Kubernetes, CI/CD, Terraform
   - Security: Security, Cryptography, Network Security, Python
   - ML/AI: Python, Machine Learning, TensorFlow/PyTorch, Deep Learning
   - QA/Test: Testing, Automation, Selenium, Python/Java
4. Extract any specific technologies mentioned in the description.
5. Return 5-8 concrete skills, not generic terms like "programming".

Return a JSON object with this EXACT schema:
{
  "required_skills": ["skill1", "skill2"],
  "role_type": "frontend|backend|fullstack|mobile|data|security|devops|general",
  "confidence": "high|medium|low"
}

Job Information:
Company: {company}
Title: {title}
Description: {description}"#;
