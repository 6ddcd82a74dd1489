//! Inline rendering: mixed text and inline tags → one LaTeX string.
//!
//! Recursive walk over the element's children. The supported inline set is
//! paragraphs (transparent), emphasis, strong, inline headings, line breaks,
//! and anchors. Anything else is reported as unsupported markup, including
//! nested lists and tables.

use scraper::{ElementRef, Node};

use handbook_shared::{HandbookError, Result};

use crate::RenderContext;
use crate::escape::{collapse_whitespace, escape_text, escape_url};

/// Render the children of `el` as a single inline LaTeX string.
///
/// The result is trimmed. Two consecutive `<br>` become a paragraph break,
/// a single `<br>` becomes a space.
pub fn render_inline(el: ElementRef<'_>, ctx: &RenderContext) -> Result<String> {
    let mut writer = InlineWriter::new(ctx);
    writer.walk(el)?;
    Ok(writer.finish())
}

struct InlineWriter<'c> {
    ctx: &'c RenderContext,
    out: String,
    /// `<br>` elements seen since the last emitted text.
    pending_breaks: usize,
}

impl<'c> InlineWriter<'c> {
    fn new(ctx: &'c RenderContext) -> Self {
        Self {
            ctx,
            out: String::new(),
            pending_breaks: 0,
        }
    }

    fn finish(self) -> String {
        self.out.trim().to_string()
    }

    fn walk(&mut self, parent: ElementRef<'_>) -> Result<()> {
        for child in parent.children() {
            if let Some(el) = ElementRef::wrap(child) {
                self.element(el)?;
            } else if let Node::Text(text) = child.value() {
                self.text(text);
            }
        }
        Ok(())
    }

    fn element(&mut self, el: ElementRef<'_>) -> Result<()> {
        match el.value().name() {
            "p" => {
                self.walk(el)?;
                self.pending_breaks = self.pending_breaks.max(1);
            }
            "em" | "i" => self.command("textit", el)?,
            "strong" | "b" => self.command("textbf", el)?,
            "h2" => self.command("subsection", el)?,
            "h3" | "h4" => self.command("subsubsection", el)?,
            "br" => self.pending_breaks += 1,
            "a" => self.link(el)?,
            other => return Err(HandbookError::unsupported(other, &el.html())),
        }
        Ok(())
    }

    fn text(&mut self, raw: &str) {
        let collapsed = collapse_whitespace(raw);

        if collapsed.trim().is_empty() {
            // Whitespace between two <br> does not separate them.
            if self.pending_breaks == 0 && !self.ends_with_space() && !self.out.is_empty() {
                self.out.push(' ');
            }
            return;
        }

        self.flush_breaks();
        let text = if self.ends_with_space() {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        self.out.push_str(&escape_text(text));
    }

    fn command(&mut self, name: &str, el: ElementRef<'_>) -> Result<()> {
        self.flush_breaks();
        self.out.push('\\');
        self.out.push_str(name);
        self.out.push('{');
        self.walk(el)?;
        self.out.push('}');
        Ok(())
    }

    fn link(&mut self, el: ElementRef<'_>) -> Result<()> {
        let Some(href) = el.value().attr("href").map(str::trim) else {
            return self.walk(el);
        };

        let target = escape_url(&self.ctx.absolutize(href));

        self.flush_breaks();
        let start = self.out.len();
        self.out.push_str(&format!("\\href{{{target}}}{{"));
        let body_start = self.out.len();
        self.walk(el)?;

        if self.out[body_start..].trim().is_empty() {
            self.out.truncate(start);
            self.out.push_str(&format!("\\url{{{target}}}"));
        } else {
            self.out.push('}');
        }
        Ok(())
    }

    fn flush_breaks(&mut self) {
        let breaks = std::mem::take(&mut self.pending_breaks);
        if self.out.is_empty() || breaks == 0 {
            return;
        }

        if breaks >= 2 {
            let kept = self.out.trim_end_matches(' ').len();
            self.out.truncate(kept);
            self.out.push_str("\n\n");
        } else if !self.ends_with_space() {
            self.out.push(' ');
        }
    }

    fn ends_with_space(&self) -> bool {
        self.out.ends_with(' ') || self.out.ends_with('\n')
    }
}
