//! HTML-to-LaTeX rendering for handbook pages.
//!
//! Walks a parsed DOM subtree and re-emits it as LaTeX: paragraphs, headings,
//! lists, tables, quotations, emphasis and links. Tags without a mapping fail
//! with [`HandbookError::UnsupportedMarkup`] instead of being dropped.

mod blocks;
mod escape;
mod inline;
mod list;
mod table;

use scraper::{ElementRef, Html};
use tracing::{debug, instrument};
use url::Url;

use handbook_shared::{ContentSelector, HandbookError, Result};

pub use blocks::render_children;
pub use escape::{clean_text, escape_text, escape_url};
pub use inline::render_inline;
pub use list::render_list;
pub use table::render_table;

// ---------------------------------------------------------------------------
// RenderContext
// ---------------------------------------------------------------------------

/// Read-only state shared by one rendering pass.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// `scheme://host[:port]` of the page being rendered.
    origin: String,
}

impl RenderContext {
    /// Context for a page served from `page_url`.
    pub fn new(page_url: &Url) -> Self {
        Self {
            origin: page_url.origin().ascii_serialization(),
        }
    }

    /// Prefix root-relative hrefs (`/node/5`) with the site origin.
    /// Everything else is returned unchanged.
    pub fn absolutize(&self, href: &str) -> String {
        if href.starts_with('/') && !href.starts_with("//") {
            format!("{}{href}", self.origin)
        } else {
            href.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Find the subtree of `doc` named by `selector`.
///
/// [`ContentSelector::AllChildren`] selects `<body>` (or the root element
/// when there is none).
pub fn select_content<'a>(doc: &'a Html, selector: &ContentSelector) -> Result<ElementRef<'a>> {
    let root = doc.root_element();

    let found = match selector {
        ContentSelector::AllChildren => Some(
            root.children()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "body")
                .unwrap_or(root),
        ),
        ContentSelector::Class { tag, class } => root
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == tag && el.value().classes().any(|c| c == class)),
    };

    found.ok_or_else(|| HandbookError::parse(format!("no element matches selector '{selector}'")))
}

/// Non-whitespace text sitting directly inside a list or table has no
/// place in the LaTeX structure, so it is reported rather than dropped.
pub(crate) fn reject_loose_text(parent: ElementRef<'_>, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        Ok(())
    } else {
        Err(HandbookError::unsupported("#text", &parent.html()))
    }
}

/// The "Scraped from" line emitted above every page.
pub fn source_attribution(url: &Url) -> String {
    format!(
        "\\textit{{Scraped from: \\href{{{}}}{{{}}}}}\\\\~\\\\\n\n",
        escape_url(url.as_str()),
        escape_text(url.as_str())
    )
}

/// Render a fetched page: attribution line, then the selected subtree's
/// children, appended to `out`.
///
/// Nothing is appended when the selector matches nothing or the content
/// holds unsupported markup.
#[instrument(skip_all, fields(url = %url, selector = %selector))]
pub fn render_page(
    url: &Url,
    doc: &Html,
    selector: &ContentSelector,
    out: &mut String,
) -> Result<()> {
    let content = select_content(doc, selector)?;
    let ctx = RenderContext::new(url);

    let mut page = source_attribution(url);
    render_children(content, &ctx, &mut page)?;

    debug!(bytes = page.len(), "page rendered");
    out.push_str(&page);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
