//! Axum route handlers for the AI résumé tools.
//!
//! Every handler validates its input first, then checks that the gateway has
//! credentials, then extracts and calls the model. Upstream and parse failures
//! come back as 200 with an `error` field.

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::normalize::Structured;
use crate::state::AppState;
use crate::tasks::{self, text_payload, InterviewContext, ParsedResume, ResumeAnalysis};
use crate::uploads::{require_text, validate, UploadForm};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Skills arrive either as a JSON list or as one comma-separated string.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
pub enum SkillList {
    List(Vec<String>),
    Text(String),
    #[default]
    Empty,
}

impl SkillList {
    pub fn joined(&self) -> String {
        match self {
            SkillList::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            SkillList::Text(text) => text.trim().to_string(),
            SkillList::Empty => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub skills: SkillList,
}

#[derive(Debug, Deserialize)]
pub struct RoadmapRequest {
    #[serde(default)]
    pub current_role: Option<String>,
    #[serde(default)]
    pub target_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub skills: SkillList,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Skills, ATS score, job roles, tips and missing skills for an uploaded résumé.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Structured<ResumeAnalysis>>, AppError> {
    let upload = UploadForm::read(multipart?).await?.require_resume()?;
    require_credentials(&state)?;

    let text = require_text(&state.upload_dir, &upload).await?;
    Ok(Json(tasks::analyze_resume(state.llm.as_ref(), &text).await))
}

/// POST /enhance-cv
///
/// Returns `{"suggestions": "<html fragment>"}`.
pub async fn handle_enhance(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let upload = UploadForm::read(multipart?).await?.require_resume()?;
    require_credentials(&state)?;

    let text = require_text(&state.upload_dir, &upload).await?;
    let suggestions = tasks::enhance_resume(state.llm.as_ref(), &text).await;
    Ok(Json(text_payload("suggestions", suggestions)))
}

/// POST /generate-cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    payload: Result<Json<CoverLetterRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    require_credentials(&state)?;

    let name = non_blank(request.name.as_deref()).unwrap_or("Candidate");
    let role = non_blank(request.role.as_deref()).unwrap_or("Job Applicant");
    let skills = request.skills.joined();

    let letter = tasks::write_cover_letter(state.llm.as_ref(), name, role, &skills).await;
    Ok(Json(text_payload("cover_letter", letter)))
}

/// POST /generate-interview
///
/// Questions from an uploaded résumé (`resume` part) or, failing that, a
/// target role (`role` field).
pub async fn handle_interview(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let mut form = UploadForm::read(multipart?).await?;

    let questions = match form.resume.take() {
        Some(raw) => {
            let upload = validate(raw)?;
            require_credentials(&state)?;
            let text = require_text(&state.upload_dir, &upload).await?;
            tasks::interview_questions(state.llm.as_ref(), InterviewContext::Resume(&text)).await
        }
        None => {
            let role = form.field("role").ok_or_else(|| {
                AppError::Validation("Provide a resume file or a target role".to_string())
            })?;
            require_credentials(&state)?;
            tasks::interview_questions(state.llm.as_ref(), InterviewContext::Role(role)).await
        }
    };

    Ok(Json(questions.wrapped("questions")))
}

/// POST /generate-roadmap
pub async fn handle_roadmap(
    State(state): State<AppState>,
    payload: Result<Json<RoadmapRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let (Some(current), Some(target)) = (
        non_blank(request.current_role.as_deref()),
        non_blank(request.target_role.as_deref()),
    ) else {
        return Err(AppError::Validation(
            "current_role and target_role are required".to_string(),
        ));
    };
    require_credentials(&state)?;

    let roadmap = tasks::career_roadmap(state.llm.as_ref(), current, target).await;
    Ok(Json(roadmap.wrapped("roadmap")))
}

/// POST /generate-profile-summary
pub async fn handle_profile_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let role = non_blank(request.role.as_deref())
        .ok_or_else(|| AppError::Validation("role is required".to_string()))?;
    require_credentials(&state)?;

    let skills = request.skills.joined();
    let summary = tasks::profile_summary(state.llm.as_ref(), role, &skills).await;
    Ok(Json(text_payload("summary", summary)))
}

/// POST /parse-resume
///
/// Structured résumé (personal block, experience, education, skills) for the builder.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Structured<ParsedResume>>, AppError> {
    let upload = UploadForm::read(multipart?).await?.require_resume()?;
    require_credentials(&state)?;

    let text = require_text(&state.upload_dir, &upload).await?;
    Ok(Json(tasks::parse_resume(state.llm.as_ref(), &text).await))
}

fn require_credentials(state: &AppState) -> Result<(), AppError> {
    if state.llm.has_credentials() {
        Ok(())
    } else {
        Err(AppError::MissingCredentials)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
