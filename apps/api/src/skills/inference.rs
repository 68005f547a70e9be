//! Rule-based skill inference from job titles and free text.

/// Upper bound on skills attached to a single listing.
pub const MAX_JOB_SKILLS: usize = 8;

/// Technologies recognised when named in a title: (needle, display name).
const TITLE_TECH: &[(&str, &str)] = &[
    ("react", "React"),
    ("angular", "Angular"),
    ("vue", "Vue"),
    ("python", "Python"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("go", "Go"),
    ("golang", "Go"),
    ("rust", "Rust"),
    ("c++", "C++"),
    ("c#", "C#"),
    ("swift", "Swift"),
    ("kotlin", "Kotlin"),
    ("aws", "AWS"),
    ("azure", "Azure"),
    ("gcp", "GCP"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("node", "Node.js"),
    ("node.js", "Node.js"),
    ("sql", "SQL"),
    (".net", ".NET"),
];

/// Extra technologies the LLM-oriented role table also recognises.
const ROLE_TECH: &[(&str, &str)] = &[
    ("tensorflow", "TensorFlow"),
    ("pytorch", "PyTorch"),
    ("mongodb", "MongoDB"),
    ("redis", "Redis"),
];

/// Unambiguous technical terms used when no LLM is available.
const KNOWN_SKILLS: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "TypeScript",
    "React",
    "Angular",
    "Vue",
    "HTML",
    "CSS",
    "SQL",
    "Git",
    "Docker",
    "Kubernetes",
    "AWS",
    "Azure",
    "Node.js",
    "Machine Learning",
    "Data Analysis",
    "TensorFlow",
    "PyTorch",
    "Pandas",
    "MongoDB",
    "PostgreSQL",
    "Linux",
    "C++",
    "API",
    "REST",
    "GraphQL",
];

/// True when `term` occurs in `haystack` with no letter or digit on either side.
/// Both arguments are expected to be lower-case already.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

/// Appends `skills` to `into`, skipping case-insensitive duplicates.
pub fn merge_unique<S: AsRef<str>>(into: &mut Vec<String>, skills: &[S]) {
    for skill in skills {
        let skill = skill.as_ref().trim();
        if skill.is_empty() {
            continue;
        }
        if !into.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            into.push(skill.to_string());
        }
    }
}

fn named_tech(title_lower: &str, table: &[(&str, &str)], out: &mut Vec<String>) {
    for (needle, name) in table {
        if contains_term(title_lower, needle) {
            merge_unique(out, &[*name]);
        }
    }
}

fn any_of(title: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| title.contains(n))
}

fn any_word(title: &str, words: &[&str]) -> bool {
    words.iter().any(|w| contains_term(title, w))
}

/// Skills for a role family, checked from most to least specific.
fn role_family_skills(title: &str) -> &'static [&'static str] {
    if any_of(title, &["frontend", "front-end", "front end"]) {
        &["JavaScript", "React", "HTML", "CSS", "TypeScript", "Frontend Development"]
    } else if any_of(title, &["backend", "back-end", "back end"]) {
        &["Python", "Java", "SQL", "API Development", "Backend Development", "REST APIs"]
    } else if any_of(title, &["full stack", "fullstack", "full-stack"]) {
        &["JavaScript", "Python", "SQL", "React", "Node.js", "Full Stack Development"]
    } else if title.contains("mobile") {
        &["Mobile Development", "Swift", "Kotlin", "Java", "iOS", "Android"]
    } else if any_of(title, &["data scien", "data analy"]) {
        &["Python", "SQL", "Data Analysis", "Machine Learning", "Statistics", "Pandas"]
    } else if title.contains("data engineer") || (title.contains("data") && title.contains("engineer"))
    {
        &["Python", "SQL", "ETL", "Data Pipelines", "Spark", "Data Engineering"]
    } else if title.contains("machine learning") || any_word(title, &["ml", "ai"]) {
        &["Python", "Machine Learning", "TensorFlow", "PyTorch", "Deep Learning"]
    } else if title.contains("devops") || any_word(title, &["sre"]) {
        &["AWS", "Docker", "Kubernetes", "CI/CD", "Linux", "DevOps"]
    } else if title.contains("cloud") {
        &["AWS", "Azure", "Cloud Computing", "Docker", "Python"]
    } else if any_of(title, &["security", "cyber"]) {
        &["Cybersecurity", "Network Security", "Python", "Security Analysis"]
    } else if any_word(title, &["qa", "sdet", "test", "testing", "quality"]) {
        &["Testing", "Test Automation", "Selenium", "Python", "Java", "QA"]
    } else if any_of(title, &["embedded", "firmware"]) {
        &["C++", "C", "Embedded Systems", "Firmware", "Hardware"]
    } else if any_word(title, &["ios"]) {
        &["Swift", "iOS", "Xcode", "Mobile Development"]
    } else if title.contains("android") {
        &["Kotlin", "Java", "Android", "Mobile Development"]
    } else if title.contains("automation") {
        &["Python", "Automation", "Testing", "Scripting"]
    } else if title.contains("database") || any_word(title, &["dba"]) {
        &["SQL", "Database Design", "MySQL", "PostgreSQL"]
    } else if title.contains("salesforce") || any_word(title, &["crm"]) {
        &["Salesforce", "CRM", "Apex", "Lightning"]
    } else if title.contains("infrastructure") {
        &["Python", "Infrastructure", "Cloud Computing", "DevOps"]
    } else {
        &["Python", "Java", "Software Development", "Algorithms", "Data Structures"]
    }
}

/// Technologies named in the title first, then the skills of its role family.
pub fn infer_skills_from_title(title: &str) -> Vec<String> {
    let title = title.to_lowercase();
    let mut skills = Vec::new();
    named_tech(&title, TITLE_TECH, &mut skills);
    merge_unique(&mut skills, role_family_skills(&title));
    skills.truncate(MAX_JOB_SKILLS);
    skills
}

/// Role table used to pad thin LLM answers. Generic roles get
/// fundamentals instead of concrete languages.
pub fn infer_skills_from_role_type(title: &str) -> Vec<String> {
    let title = title.to_lowercase();
    let mut skills = Vec::new();
    named_tech(&title, TITLE_TECH, &mut skills);
    named_tech(&title, ROLE_TECH, &mut skills);

    let family: &[&str] = if any_of(&title, &["frontend", "front-end", "front end"]) {
        &["JavaScript", "React", "HTML", "CSS", "TypeScript", "Frontend Development"]
    } else if any_of(&title, &["backend", "back-end", "back end"]) {
        &["Python", "Java", "SQL", "API Development", "Backend Development", "REST APIs"]
    } else if any_of(&title, &["full stack", "fullstack", "full-stack"]) {
        &["JavaScript", "Python", "SQL", "React", "Node.js", "Full Stack Development"]
    } else if title.contains("mobile") {
        &["Mobile Development", "Swift", "Kotlin", "Java", "iOS", "Android"]
    } else if any_of(&title, &["data scien", "data analy"]) {
        &["Python", "SQL", "Data Analysis", "Machine Learning", "Statistics", "Pandas"]
    } else if title.contains("data engineer") {
        &["Python", "SQL", "ETL", "Data Pipelines", "Spark", "Data Engineering"]
    } else if title.contains("machine learning") || any_word(&title, &["ml", "ai"]) {
        &["Python", "Machine Learning", "TensorFlow", "PyTorch", "Deep Learning", "Neural Networks"]
    } else if title.contains("devops") || any_word(&title, &["sre"]) {
        &["AWS", "Docker", "Kubernetes", "CI/CD", "Linux", "DevOps"]
    } else if title.contains("cloud") {
        &["AWS", "Azure", "Cloud Computing", "Docker", "Kubernetes"]
    } else if title.contains("security") {
        &["Cybersecurity", "Network Security", "Python", "Security Analysis", "Cryptography"]
    } else if any_word(&title, &["qa", "sdet", "test", "testing"]) {
        &["Testing", "Test Automation", "Selenium", "Python", "Java", "QA"]
    } else if any_of(&title, &["embedded", "firmware"]) {
        &["C++", "C", "Embedded Systems", "Firmware", "Hardware"]
    } else if any_word(&title, &["ios"]) {
        &["Swift", "iOS", "Xcode", "Mobile Development"]
    } else if title.contains("android") {
        &["Kotlin", "Java", "Android", "Mobile Development"]
    } else {
        &["Programming", "Algorithms", "Data Structures", "Software Development", "Problem Solving"]
    };

    merge_unique(&mut skills, family);
    skills.truncate(MAX_JOB_SKILLS);
    skills
}

/// Scans free text for [`KNOWN_SKILLS`], in list order.
pub fn extract_known_skills(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    KNOWN_SKILLS
        .iter()
        .filter(|skill| contains_term(&text, &skill.to_lowercase()))
        .map(|skill| skill.to_string())
        .collect()
}
