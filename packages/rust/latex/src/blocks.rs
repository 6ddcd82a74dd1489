//! Structural rendering: one LaTeX block per child element, in document order.

use scraper::{ElementRef, Node};
use tracing::{debug, warn};

use handbook_shared::{HandbookError, Result};

use crate::RenderContext;
use crate::escape::clean_text;
use crate::inline::render_inline;
use crate::list::render_list;
use crate::table::render_table;

/// Render every child of `parent` as a sequence of LaTeX blocks.
///
/// Text directly under a structural container is not rendered; comments are
/// skipped. Any element without a mapping fails with
/// [`HandbookError::UnsupportedMarkup`].
pub fn render_children(
    parent: ElementRef<'_>,
    ctx: &RenderContext,
    out: &mut String,
) -> Result<()> {
    for child in parent.children() {
        if let Some(el) = ElementRef::wrap(child) {
            render_block(el, ctx, out)?;
        } else if let Node::Text(text) = child.value() {
            if !text.trim().is_empty() {
                warn!(
                    parent = parent.value().name(),
                    text = text.trim(),
                    "dropping loose text in structural container"
                );
            }
        }
    }
    Ok(())
}

fn render_block(el: ElementRef<'_>, ctx: &RenderContext, out: &mut String) -> Result<()> {
    let name = el.value().name();
    debug!(tag = name, "rendering block");

    match name {
        "p" | "h4" => {
            let text = render_inline(el, ctx)?;
            if !text.is_empty() {
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }
        "h2" | "h3" => {
            let title = clean_text(&el.text().collect::<String>());
            out.push_str(&format!("\\subsection{{{title}}}\n\n"));
        }
        "ul" | "ol" => render_list(el, ctx, out)?,
        "div" => render_children(el, ctx, out)?,
        "table" => render_table(el, ctx, out)?,
        "blockquote" => {
            out.push_str("\\begin{quote}\n");
            render_children(el, ctx, out)?;
            out.push_str("\\end{quote}\n\n");
        }
        other => return Err(HandbookError::unsupported(other, &el.html())),
    }
    Ok(())
}
