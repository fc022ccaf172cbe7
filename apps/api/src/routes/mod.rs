pub mod health;
pub mod pages;
pub mod tools;


use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::auth::handlers as auth;
use crate::state::AppState;
use crate::uploads::MAX_UPLOAD_BYTES;

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(pages::index))
        .route("/enhance", get(pages::enhance))
        .route("/builder", get(pages::builder))
        .route("/interview", get(pages::interview))
        .route("/roadmap", get(pages::roadmap))
        .route("/templates", get(pages::gallery))
        // Accounts
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/register", get(auth::register_page).post(auth::register_submit))
        .route("/logout", get(auth::logout))
        // AI tools
        .route("/analyze", post(tools::handle_analyze))
        .route("/enhance-cv", post(tools::handle_enhance))
        .route("/generate-cover-letter", post(tools::handle_cover_letter))
        .route("/generate-interview", post(tools::handle_interview))
        .route("/generate-roadmap", post(tools::handle_roadmap))
        .route(
            "/generate-profile-summary",
            post(tools::handle_profile_summary),
        )
        .route("/parse-resume", post(tools::handle_parse_resume))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
