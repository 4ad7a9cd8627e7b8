//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::filters;
use crate::routes::products::ProductView;
use crate::services::settings::SiteChrome;
use crate::state::AppState;

/// Number of products featured on the home page.
const FEATURED_COUNT: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: SiteChrome,
    pub hero_heading: String,
    pub hero_subheading: String,
    pub featured: Vec<ProductView>,
}

/// Display the home page with hero copy and a few featured products.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> HomeTemplate {
    let settings = state.settings();
    let products = state.db().products.list_active().await;

    HomeTemplate {
        chrome: settings.chrome().await,
        hero_heading: settings
            .text("hero_heading", "Southern charm, delivered")
            .await,
        hero_subheading: settings.text("hero_subheading", "").await,
        featured: products
            .iter()
            .take(FEATURED_COUNT)
            .map(ProductView::from)
            .collect(),
    }
}
