//! Login, registration and logout routes.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;
use tracing::info;

use crate::auth::{
    authenticate, register_user, AuthError, LoginForm, RegistrationForm, SessionUser,
    SESSION_USER_KEY,
};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginPage {
    error: Option<String>,
    notice: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterPage {
    error: Option<String>,
    registration_open: bool,
}

/// GET /login
pub async fn login_page() -> Result<Html<String>, AppError> {
    render_login(None, None)
}

/// POST /login
pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match authenticate(state.users.as_ref(), &form).await {
        Ok(user) => {
            session.cycle_id().await?;
            session
                .insert(SESSION_USER_KEY, SessionUser::from(&user))
                .await?;
            info!("User {} logged in", user.id);
            Ok(Redirect::to("/").into_response())
        }
        Err(e) if e.is_user_facing() => Ok(render_login(Some(e.to_string()), None)?.into_response()),
        Err(e) => Err(internal(e)),
    }
}

/// GET /register
pub async fn register_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_register(None, state.registration_open)
}

/// POST /register
pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Result<Html<String>, AppError> {
    match register_user(state.users.as_ref(), state.registration_open, &form).await {
        Ok(user) => {
            info!("Registered user {}", user.id);
            render_login(
                None,
                Some("Registration successful. Please log in.".to_string()),
            )
        }
        Err(e) if e.is_user_facing() => {
            render_register(Some(e.to_string()), state.registration_open)
        }
        Err(e) => Err(internal(e)),
    }
}

/// GET /logout
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    session.flush().await?;
    Ok(Redirect::to("/login"))
}

fn render_login(error: Option<String>, notice: Option<String>) -> Result<Html<String>, AppError> {
    Ok(Html(LoginPage { error, notice }.render()?))
}

fn render_register(error: Option<String>, registration_open: bool) -> Result<Html<String>, AppError> {
    Ok(Html(
        RegisterPage {
            error,
            registration_open,
        }
        .render()?,
    ))
}

fn internal(e: AuthError) -> AppError {
    match e {
        AuthError::Store(db) => AppError::Database(db),
        other => AppError::Internal(anyhow::anyhow!(other)),
    }
}
