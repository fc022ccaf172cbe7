//! Résumé tasks: one prompt, one gateway call, one normalization each.
//!
//! Structured tasks return `Structured<T>`, which serializes either as the
//! typed answer or as `{"error": raw}`. Free-text tasks return the gateway
//! text untouched (including its `Error...` strings).

pub mod prompts;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm_client::normalize::{error_payload, normalize, strip_html_fences, Structured};
use crate::llm_client::{is_error_text, TextGenerator};
use crate::tasks::prompts::{
    render, ANALYSIS_PROMPT, COVER_LETTER_PROMPT, ENHANCE_PROMPT, INTERVIEW_PROMPT, PARSE_PROMPT,
    ROADMAP_PROMPT, SUMMARY_PROMPT,
};

/// Longest slice of résumé text or user input embedded in a prompt.
pub const MAX_PROMPT_INPUT_CHARS: usize = 4000;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeAnalysis {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub job_roles: Vec<JobRole>,
    /// 0 – 100
    pub ats_score: u32,
    pub ats_tips: Vec<String>,
    pub missing_skills: Vec<MissingSkill>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRole {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingSkill {
    pub skill: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewQuestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapStep {
    pub step: String,
    pub description: String,
}

/// Experience/education/skill entries stay free-form; models disagree on their shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResume {
    pub personal: PersonalDetails,
    pub experience: Vec<Value>,
    pub education: Vec<Value>,
    pub skills: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDetails {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub linkedin: String,
    pub summary: String,
}

/// What the interview questions are based on.
#[derive(Debug, Clone, Copy)]
pub enum InterviewContext<'a> {
    Resume(&'a str),
    Role(&'a str),
}

impl InterviewContext<'_> {
    fn describe(&self) -> String {
        match self {
            InterviewContext::Resume(text) => {
                format!("Resume Content:\n{}", clip(text))
            }
            InterviewContext::Role(role) => format!("Target Role: {}", clip(role)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tasks
// ────────────────────────────────────────────────────────────────────────────

pub async fn analyze_resume(
    llm: &dyn TextGenerator,
    resume_text: &str,
) -> Structured<ResumeAnalysis> {
    let prompt = render(ANALYSIS_PROMPT, &[("resume_text", clip(resume_text))], true);
    normalize::<ResumeAnalysis>(llm.generate(&prompt).await).map(|mut analysis| {
        analysis.ats_score = analysis.ats_score.min(100);
        analysis
    })
}

/// HTML critique fragment with any code fences removed.
pub async fn enhance_resume(llm: &dyn TextGenerator, resume_text: &str) -> String {
    let prompt = render(ENHANCE_PROMPT, &[("resume_text", clip(resume_text))], false);
    strip_html_fences(&llm.generate(&prompt).await)
}

pub async fn write_cover_letter(
    llm: &dyn TextGenerator,
    name: &str,
    role: &str,
    skills: &str,
) -> String {
    let prompt = render(
        COVER_LETTER_PROMPT,
        &[("name", clip(name)), ("role", clip(role)), ("skills", clip(skills))],
        false,
    );
    llm.generate(&prompt).await
}

pub async fn interview_questions(
    llm: &dyn TextGenerator,
    context: InterviewContext<'_>,
) -> Structured<Vec<InterviewQuestion>> {
    let context = context.describe();
    let prompt = render(INTERVIEW_PROMPT, &[("context", context.as_str())], true);
    normalize(llm.generate(&prompt).await)
}

pub async fn career_roadmap(
    llm: &dyn TextGenerator,
    current_role: &str,
    target_role: &str,
) -> Structured<Vec<RoadmapStep>> {
    let prompt = render(
        ROADMAP_PROMPT,
        &[
            ("current_role", clip(current_role)),
            ("target_role", clip(target_role)),
        ],
        true,
    );
    normalize(llm.generate(&prompt).await)
}

pub async fn profile_summary(llm: &dyn TextGenerator, role: &str, skills: &str) -> String {
    let prompt = render(
        SUMMARY_PROMPT,
        &[("role", clip(role)), ("skills", clip(skills))],
        false,
    );
    llm.generate(&prompt).await
}

pub async fn parse_resume(llm: &dyn TextGenerator, resume_text: &str) -> Structured<ParsedResume> {
    let prompt = render(PARSE_PROMPT, &[("resume_text", clip(resume_text))], true);
    normalize(llm.generate(&prompt).await)
}

/// `{key: text}` for model output, `{"error": text}` for a gateway failure.
pub fn text_payload(key: &str, text: String) -> Value {
    if is_error_text(&text) {
        return error_payload(&text);
    }
    let mut map = Map::new();
    map.insert(key.to_string(), Value::String(text));
    Value::Object(map)
}

/// First `max` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn clip(text: &str) -> &str {
    truncate_chars(text, MAX_PROMPT_INPUT_CHARS)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Canned generator that records every prompt it receives.
    pub(crate) struct StubGenerator {
        pub reply: String,
        pub credentials: bool,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                credentials: true,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn without_credentials() -> Self {
            Self {
                credentials: false,
                ..Self::replying("")
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        fn has_credentials(&self) -> bool {
            self.credentials
        }

        async fn generate(&self, prompt: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[tokio::test]
    async fn test_analyze_parses_fenced_output_and_clamps_score() {
        let stub = StubGenerator::replying(
            "```json\n{\"technical_skills\": [\"Rust\"], \"ats_score\": 140}\n```",
        );
        let result = analyze_resume(&stub, "Rust developer").await;

        let Structured::Parsed(analysis) = result else {
            panic!("expected parsed analysis");
        };
        assert_eq!(analysis.technical_skills, vec!["Rust"]);
        assert_eq!(analysis.ats_score, 100);
        assert!(analysis.job_roles.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_failure_embeds_raw_text() {
        let stub = StubGenerator::replying("Error 500: upstream exploded");
        let result = analyze_resume(&stub, "text").await;

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"error": "Error 500: upstream exploded"})
        );
    }

    #[tokio::test]
    async fn test_analyze_prompt_embeds_at_most_4000_chars() {
        let stub = StubGenerator::replying("{}");
        let resume = "a".repeat(5000) + "TAIL_MARKER";
        analyze_resume(&stub, &resume).await;

        let prompt = stub.last_prompt();
        assert!(prompt.contains(&"a".repeat(4000)));
        assert!(!prompt.contains(&"a".repeat(4001)));
        assert!(!prompt.contains("TAIL_MARKER"));
    }

    #[tokio::test]
    async fn test_interview_questions_from_role() {
        let stub = StubGenerator::replying(
            r#"[{"type": "Technical", "question": "What is ownership?", "answer": "..."}]"#,
        );
        let result = interview_questions(&stub, InterviewContext::Role("Rust Engineer")).await;

        assert!(stub.last_prompt().contains("Target Role: Rust Engineer"));
        let Structured::Parsed(questions) = result else {
            panic!("expected questions");
        };
        assert_eq!(questions[0].kind, "Technical");
        assert_eq!(
            serde_json::to_value(&questions[0]).unwrap()["type"],
            "Technical"
        );
    }

    #[tokio::test]
    async fn test_roadmap_serializes_as_plain_list() {
        let stub = StubGenerator::replying(
            "```\n[{\"step\": \"Learn Go\", \"description\": \"Tour of Go\"}]\n```",
        );
        let result = career_roadmap(&stub, "Analyst", "Engineer").await;
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!([{"step": "Learn Go", "description": "Tour of Go"}])
        );
    }

    #[tokio::test]
    async fn test_enhance_strips_html_fences() {
        let stub = StubGenerator::replying("```html\n<h3>Impact</h3>\n```");
        assert_eq!(enhance_resume(&stub, "cv").await, "<h3>Impact</h3>");
    }

    #[tokio::test]
    async fn test_parse_resume_defaults_missing_sections() {
        let stub = StubGenerator::replying(r#"{"personal": {"name": "Jane"}}"#);
        let Structured::Parsed(parsed) = parse_resume(&stub, "Jane").await else {
            panic!("expected parsed resume");
        };
        assert_eq!(parsed.personal.name, "Jane");
        assert!(parsed.experience.is_empty());
    }

    #[test]
    fn test_text_payload() {
        assert_eq!(
            text_payload("summary", "A seasoned engineer.".to_string()),
            json!({"summary": "A seasoned engineer."})
        );
        assert_eq!(
            text_payload("summary", "Error 429: quota".to_string()),
            json!({"error": "Error 429: quota"})
        );
    }

    #[tokio::test]
    async fn test_cover_letter_passes_gateway_text_through() {
        let stub = StubGenerator::replying("Dear Hiring Manager, ...");
        let letter = write_cover_letter(&stub, "Sam", "Data Analyst", "SQL, Python").await;
        assert_eq!(letter, "Dear Hiring Manager, ...");
        assert!(stub.last_prompt().contains("Key Skills: SQL, Python"));
    }
}
