//! Markdown pages: service information, pricing and FAQ.
//!
//! Pages are loaded from `<content_dir>/pages/*.md` at startup. Each file
//! has YAML frontmatter parsed into [`PageMeta`]; the body is rendered to
//! HTML with comrak. The file stem is the page slug.

use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use pawmilya_core::ServiceCategory;

/// Slugs served at the site root, one per service information page.
pub const SERVICE_PAGES: [&str; 11] = [
    "pet-grooming",
    "veterinary-care",
    "vaccination",
    "pet-shop",
    "tonometry",
    "surgery-with-gas-anesthetic-machine",
    "hematology",
    "digital-xray",
    "dentistry",
    "pharmacy-services",
    "blood-chemistry",
];

/// Frontmatter for a page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Short line under the title.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Service label preselected by the page's "Book" button.
    #[serde(default)]
    pub book_service: Option<String>,
}

impl PageMeta {
    /// Service preselected by the page's booking link, when it names one.
    #[must_use]
    pub fn booking_service(&self) -> Option<ServiceCategory> {
        self.book_service.as_deref().and_then(ServiceCategory::from_label)
    }
}

/// A rendered page.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// All pages, loaded once.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load all pages from `content_dir/pages`.
    ///
    /// A missing directory yields an empty store. A page that fails to
    /// parse is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_page(&path) {
                    Ok(page) => {
                        tracing::debug!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        for slug in SERVICE_PAGES {
            if !pages.contains_key(slug) {
                tracing::warn!(slug, "Service page missing from content directory");
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
            .to_string();

        let matter = Matter::<YAML>::new();
        let parsed: ParsedEntity<PageMeta> = matter
            .parse(&content)
            .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
        let meta = parsed
            .data
            .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

        Ok(Page {
            slug,
            meta,
            content_html: render_markdown(&parsed.content),
        })
    }

    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Service pages present in the store, in menu order.
    pub fn service_pages(&self) -> impl Iterator<Item = &Page> {
        SERVICE_PAGES.iter().filter_map(|slug| self.pages.get(*slug))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Render markdown to HTML with tables enabled for the price lists.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_renders_tables_and_frontmatter() {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("pages");
        std::fs::create_dir_all(&pages).unwrap();
        std::fs::write(
            pages.join("hematology.md"),
            "---\ntitle: Hematology\nbook_service: Hematology\n---\n\n| Test | Price |\n|---|---|\n| CBC | ₱800 |\n",
        )
        .unwrap();
        std::fs::write(pages.join("broken.md"), "no frontmatter here").unwrap();

        let store = ContentStore::load(dir.path()).unwrap();
        let page = store.get_page("hematology").unwrap();

        assert_eq!(page.meta.title, "Hematology");
        assert_eq!(page.meta.booking_service(), Some(ServiceCategory::Hematology));
        assert!(page.content_html.contains("<table>"));
        assert!(store.get_page("broken").is_none());
        assert_eq!(store.service_pages().count(), 1);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::load(&dir.path().join("nope")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = render_markdown("<script>alert(1)</script>\n\nHello");
        assert!(!html.contains("<script>"));
    }
}
