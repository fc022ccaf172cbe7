//! Server-rendered pages. Only the dashboard requires a login.

use askama::Template;
use axum::response::Html;

use crate::auth::CurrentUser;
use crate::errors::AppError;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage {
    username: String,
}

#[derive(Template)]
#[template(path = "enhance.html")]
struct EnhancePage {
    title: &'static str,
}

#[derive(Template)]
#[template(path = "builder.html")]
struct BuilderPage {
    title: &'static str,
}

#[derive(Template)]
#[template(path = "interview.html")]
struct InterviewPage {
    title: &'static str,
}

#[derive(Template)]
#[template(path = "roadmap.html")]
struct RoadmapPage {
    title: &'static str,
}

#[derive(Template)]
#[template(path = "gallery.html")]
struct GalleryPage {
    templates: &'static [ResumeTemplate],
}

/// One entry of the résumé template gallery.
pub struct ResumeTemplate {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const GALLERY: &[ResumeTemplate] = &[
    ResumeTemplate {
        slug: "classic",
        name: "Classic",
        description: "Single column, serif headings. Safe for every ATS.",
    },
    ResumeTemplate {
        slug: "modern",
        name: "Modern",
        description: "Accent colour sidebar with skills and contact details.",
    },
    ResumeTemplate {
        slug: "compact",
        name: "Compact",
        description: "Dense two-column layout for long experience sections.",
    },
];

/// GET /
pub async fn index(CurrentUser(user): CurrentUser) -> Result<Html<String>, AppError> {
    render(IndexPage {
        username: user.username,
    })
}

/// GET /enhance
pub async fn enhance() -> Result<Html<String>, AppError> {
    render(EnhancePage {
        title: "Enhance your CV",
    })
}

/// GET /builder
pub async fn builder() -> Result<Html<String>, AppError> {
    render(BuilderPage {
        title: "Resume builder",
    })
}

/// GET /interview
pub async fn interview() -> Result<Html<String>, AppError> {
    render(InterviewPage {
        title: "Interview practice",
    })
}

/// GET /roadmap
pub async fn roadmap() -> Result<Html<String>, AppError> {
    render(RoadmapPage {
        title: "Career roadmap",
    })
}

/// GET /templates
pub async fn gallery() -> Result<Html<String>, AppError> {
    render(GalleryPage { templates: GALLERY })
}

fn render(page: impl Template) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}
