// Prompt templates for every résumé task.
// Placeholders in braces are replaced with `str::replace` before sending.

/// Appended to every prompt whose answer is parsed as JSON.
const JSON_ONLY: &str = "Return ONLY the JSON, with no markdown formatting and no commentary.";

pub const ANALYSIS_PROMPT: &str = r#"You are an expert ATS (Applicant Tracking System) scanner and career coach. Analyze the resume text below.

Resume Text:
{resume_text}

Tasks:
1. Extract specific Technical Skills (programming, tools, hard skills).
2. Extract specific Soft Skills (communication, leadership, etc.).
3. Suggest 3 suitable job roles, each with a title and a description of why it fits.
4. Estimate an ATS Score between 0 and 100.
5. Provide 3 specific tips to improve the resume.
6. Identify 3 critical MISSING skills for the suggested roles, each with a brief recommendation on how to learn or demonstrate it.

Use exactly this structure:
{
  "technical_skills": ["Tech Skill 1", "Tech Skill 2"],
  "soft_skills": ["Soft Skill 1", "Soft Skill 2"],
  "job_roles": [{"title": "Role 1", "description": "Why this fits..."}],
  "ats_score": 0,
  "ats_tips": ["Tip 1", "Tip 2", "Tip 3"],
  "missing_skills": [{"skill": "Missing Skill 1", "recommendation": "Take a course on..."}]
}
"#;

pub const COVER_LETTER_PROMPT: &str = r#"Write a professional and persuasive cover letter for:
Candidate Name: {name}
Target Job Role: {role}
Key Skills: {skills}

The tone should be enthusiastic, professional, and confident.
Keep it concise (under 300 words)."#;

pub const ENHANCE_PROMPT: &str = r#"You are a top-tier resume writer and career coach. Review the resume text below and give a detailed critique to ENHANCE it.

Resume Text:
{resume_text}

Focus on:
1. Impact & Clarity: are bullet points result-oriented ("Increased sales by 20%" rather than "Responsible for sales")?
2. Structure & Formatting: is the layout logical? Infer structure from the flow of the text.
3. Language: use of strong action verbs.
4. Missing Content: which important sections are missing (Projects, Certifications, ...)?

Output format: a structured HTML fragment, NOT Markdown and NOT JSON.
Use <h3> for headings, <ul> and <li> for points and <strong> for emphasis.
Do NOT include <html> or <body> tags.
Example:
<h3>1. Impact Analysis</h3>
<ul><li>...</li></ul>"#;

pub const INTERVIEW_PROMPT: &str = r#"You are an expert interviewer. Based on the following candidate context, generate 5 relevant interview questions.

{context}

Include a mix of Technical, Behavioral and Project-specific questions based on the resume or role.
For each question provide a sample "Best Answer".

Use exactly this structure:
[
  {"type": "Technical/Behavioral", "question": "...", "answer": "..."}
]
"#;

pub const ROADMAP_PROMPT: &str = r#"Create a 5-step career roadmap to go from {current_role} to {target_role}.

Use exactly this structure:
[
  {"step": "Step 1 Title", "description": "Details..."}
]
"#;

pub const SUMMARY_PROMPT: &str = "Write a concise, professional resume summary (3-4 sentences) \
for a {role} with skills: {skills}.";

pub const PARSE_PROMPT: &str = r#"Extract the resume below into JSON.

Resume:
{resume_text}

Use exactly this structure:
{
  "personal": {"name": "", "email": "", "mobile": "", "linkedin": "", "summary": ""},
  "experience": [],
  "education": [],
  "skills": []
}
"#;

/// Fills `template` and, for structured tasks, appends the JSON-only rule.
pub fn render(template: &str, vars: &[(&str, &str)], json_only: bool) -> String {
    let mut prompt = vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    });
    if json_only {
        prompt.push('\n');
        prompt.push_str(JSON_ONLY);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_placeholders() {
        let prompt = render(
            ROADMAP_PROMPT,
            &[("current_role", "QA Analyst"), ("target_role", "SRE")],
            true,
        );
        assert!(prompt.contains("go from QA Analyst to SRE"));
        assert!(prompt.ends_with(JSON_ONLY));
        assert!(!prompt.contains("{current_role}"));
    }

    #[test]
    fn test_render_leaves_json_braces_alone() {
        let prompt = render(ANALYSIS_PROMPT, &[("resume_text", "Jane")], true);
        assert!(prompt.contains("\"technical_skills\""));
        assert!(prompt.contains("Resume Text:\nJane"));
    }

    #[test]
    fn test_free_text_prompts_skip_json_rule() {
        let prompt = render(SUMMARY_PROMPT, &[("role", "Designer"), ("skills", "Figma")], false);
        assert!(!prompt.contains(JSON_ONLY));
        assert!(prompt.contains("for a Designer with skills: Figma."));
    }
}
