//! `<ul>` / `<ol>` → `itemize` / `enumerate`.

use scraper::{ElementRef, Node};

use handbook_shared::{HandbookError, Result};

use crate::inline::render_inline;
use crate::{RenderContext, reject_loose_text};

/// Emit one `\item` per `<li>` in document order.
///
/// Lists nested inside an item are rejected by the inline renderer. A list
/// without items emits nothing, since LaTeX refuses an empty `itemize`.
pub fn render_list(list: ElementRef<'_>, ctx: &RenderContext, out: &mut String) -> Result<()> {
    let env = match list.value().name() {
        "ol" => "enumerate",
        _ => "itemize",
    };

    let mut items = Vec::new();
    for child in list.children() {
        if let Some(el) = ElementRef::wrap(child) {
            match el.value().name() {
                "li" => items.push(render_inline(el, ctx)?),
                other => return Err(HandbookError::unsupported(other, &list.html())),
            }
        } else if let Node::Text(text) = child.value() {
            reject_loose_text(list, text)?;
        }
    }

    if items.is_empty() {
        tracing::debug!(env, "skipping empty list");
        return Ok(());
    }

    out.push_str(&format!("\\begin{{{env}}}\n"));
    for item in items {
        out.push_str("\\item ");
        out.push_str(&item);
        out.push('\n');
    }
    out.push_str(&format!("\\end{{{env}}}\n\n"));
    Ok(())
}
