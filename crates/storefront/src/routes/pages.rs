//! Static-ish content pages driven by site settings.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::filters;
use crate::services::settings::SiteChrome;
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub chrome: SiteChrome,
    pub header: String,
    pub subheader: String,
    pub body: String,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub chrome: SiteChrome,
    pub contact_email: String,
    pub contact_phone: String,
}

/// Display the about page.
#[instrument(skip(state))]
pub async fn about(State(state): State<AppState>) -> AboutTemplate {
    let settings = state.settings();
    AboutTemplate {
        chrome: settings.chrome().await,
        header: settings.text("about_header", "Our Story").await,
        subheader: settings.text("about_subheader", "").await,
        body: settings.text("about_text", "").await,
    }
}

/// Display the contact page.
#[instrument(skip(state))]
pub async fn contact(State(state): State<AppState>) -> ContactTemplate {
    let settings = state.settings();
    ContactTemplate {
        chrome: settings.chrome().await,
        contact_email: settings.text("contact_email", "").await,
        contact_phone: settings.text("contact_phone", "").await,
    }
}
