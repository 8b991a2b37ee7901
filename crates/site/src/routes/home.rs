//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;
use crate::views::PageContext;

/// A highlighted service on the home page.
pub struct Highlight {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub price_range: &'static str,
}

const HIGHLIGHTS: [Highlight; 4] = [
    Highlight {
        slug: "veterinary-care",
        title: "Veterinary Care",
        description: "Professional medical care for pets, including diagnostics, treatments, and preventive services.",
        price_range: "₱1,500 - ₱2,500",
    },
    Highlight {
        slug: "pet-grooming",
        title: "Pet Grooming",
        description: "Complete grooming services including bathing, haircuts, nail trimming, and ear cleaning.",
        price_range: "₱800 - ₱1,500",
    },
    Highlight {
        slug: "vaccination",
        title: "Vaccinations & Deworming",
        description: "Essential vaccines to protect your pet against common diseases and maintain their health.",
        price_range: "₱500 - ₱1,800",
    },
    Highlight {
        slug: "pet-shop",
        title: "Pet Shop",
        description: "Quality pet supplies, food, toys, and accessories for all your pet's needs.",
        price_range: "Varies",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub highlights: &'static [Highlight],
}

/// Display the home page.
#[instrument(skip(ctx))]
pub async fn home(ctx: PageContext) -> impl IntoResponse {
    HomeTemplate {
        ctx,
        highlights: &HIGHLIGHTS,
    }
}
