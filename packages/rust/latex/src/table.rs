//! `<table>` → centred, width-limited `tabular`.

use scraper::{ElementRef, Node};

use handbook_shared::{HandbookError, Result};

use crate::inline::render_inline;
use crate::{RenderContext, reject_loose_text};

/// Emit a tabular block for `table`.
///
/// Rows are taken from the table itself and from its `thead`, `tbody` and
/// `tfoot` groups, in document order. Anything else (`caption`, `colgroup`,
/// stray text) is unsupported. Header cells come before data cells within
/// each row. Ragged rows are right-padded with empty cells up to the widest
/// row.
pub fn render_table(table: ElementRef<'_>, ctx: &RenderContext, out: &mut String) -> Result<()> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    collect_rows(table, ctx, &mut rows)?;

    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    if col_count == 0 {
        tracing::debug!("skipping table without cells");
        return Ok(());
    }

    for row in &mut rows {
        row.resize(col_count, String::new());
    }

    out.push_str("\\begin{center}\n");
    out.push_str("\\begin{adjustbox}{max width=\\textwidth}\n");
    out.push_str(&format!("\\begin{{tabular}}{{{}}}\n", "l".repeat(col_count)));
    for row in &rows {
        out.push_str(&row.join(" & "));
        out.push_str(" \\\\\n");
    }
    out.push_str("\\end{tabular}\n");
    out.push_str("\\end{adjustbox}\n");
    out.push_str("\\end{center}\n\n");

    Ok(())
}

fn collect_rows(
    parent: ElementRef<'_>,
    ctx: &RenderContext,
    rows: &mut Vec<Vec<String>>,
) -> Result<()> {
    let in_table = parent.value().name() == "table";

    for child in parent.children() {
        if let Some(el) = ElementRef::wrap(child) {
            match el.value().name() {
                "thead" | "tbody" | "tfoot" if in_table => collect_rows(el, ctx, rows)?,
                "tr" => rows.push(render_row(el, ctx)?),
                other => return Err(HandbookError::unsupported(other, &el.html())),
            }
        } else if let Node::Text(text) = child.value() {
            reject_loose_text(parent, text)?;
        }
    }
    Ok(())
}

/// One row's cells, headers first.
fn render_row(tr: ElementRef<'_>, ctx: &RenderContext) -> Result<Vec<String>> {
    let mut headers = Vec::new();
    let mut data = Vec::new();

    for child in tr.children() {
        let Some(cell) = ElementRef::wrap(child) else {
            if let Node::Text(text) = child.value() {
                reject_loose_text(tr, text)?;
            }
            continue;
        };

        let target = match cell.value().name() {
            "th" => &mut headers,
            "td" => &mut data,
            other => return Err(HandbookError::unsupported(other, &tr.html())),
        };
        // A paragraph break would end the row early.
        let content = render_inline(cell, ctx)?.replace("\n\n", " ");
        target.push(content);
    }

    headers.append(&mut data);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};
    use url::Url;

    fn render(html: &str) -> Result<String> {
        let ctx = RenderContext::new(&Url::parse("https://example.com/").unwrap());
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("table").unwrap();
        let table = doc.select(&sel).next().expect("table present");
        let mut out = String::new();
        render_table(table, &ctx, &mut out)?;
        Ok(out)
    }

    #[test]
    fn ragged_rows_are_padded() {
        let out = render(
            "<table>
                <tr><td>a</td><td>b</td></tr>
                <tr><td>c</td><td>d</td><td>e</td></tr>
                <tr><td>f</td></tr>
            </table>",
        )
        .unwrap();

        assert!(out.contains("\\begin{tabular}{lll}\n"));
        assert!(out.contains("a & b &  \\\\\n"));
        assert!(out.contains("c & d & e \\\\\n"));
        assert!(out.contains("f &  &  \\\\\n"));
    }

    #[test]
    fn header_cells_come_first() {
        let out = render(
            "<table><tbody><tr><td>1 unit</td><th>Course</th></tr></tbody></table>",
        )
        .unwrap();
        assert!(out.contains("Course & 1 unit \\\\\n"));
    }

    #[test]
    fn thead_and_tbody_rows_in_order() {
        let out = render(
            "<table>
                <thead><tr><th>Name</th><th>Units</th></tr></thead>
                <tbody><tr><td>BENG 202</td><td>4</td></tr></tbody>
            </table>",
        )
        .unwrap();
        let header = out.find("Name & Units").unwrap();
        let body = out.find("BENG 202 & 4").unwrap();
        assert!(header < body);
    }

    #[test]
    fn environment_is_centred_and_width_limited() {
        let out = render("<table><tr><td>x</td></tr></table>").unwrap();
        assert!(out.starts_with("\\begin{center}\n\\begin{adjustbox}{max width=\\textwidth}\n"));
        assert!(out.ends_with("\\end{tabular}\n\\end{adjustbox}\n\\end{center}\n\n"));
    }

    #[test]
    fn cell_content_is_escaped_and_linked() {
        let out = render(r#"<table><tr><td>R&amp;D</td><td><a href="/x">x</a></td></tr></table>"#)
            .unwrap();
        assert!(out.contains(r"R\&D & \href{https://example.com/x}{x} \\"));
    }

    #[test]
    fn cell_paragraph_breaks_are_flattened() {
        let out = render("<table><tr><td>a<br><br>b</td></tr></table>").unwrap();
        assert!(out.contains("a b \\\\\n"));
    }

    #[test]
    fn empty_table_emits_nothing() {
        assert_eq!(render("<table></table>").unwrap(), "");
    }

    #[test]
    fn list_in_cell_is_unsupported() {
        let err = render("<table><tr><td><ul><li>x</li></ul></td></tr></table>").unwrap_err();
        assert!(err.is_unsupported_markup());
    }

    #[test]
    fn caption_is_unsupported() {
        let err = render("<table><caption>Fees 2024</caption><tr><td>a</td></tr></table>")
            .unwrap_err();
        match err {
            HandbookError::UnsupportedMarkup { tag, context } => {
                assert_eq!(tag, "caption");
                assert!(context.contains("Fees 2024"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn colgroup_is_unsupported() {
        let err = render(
            r#"<table><colgroup><col span="2"></colgroup><tr><td>a</td><td>b</td></tr></table>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("<colgroup>"));
    }

    #[test]
    fn tfoot_rows_follow_body() {
        let out = render(
            "<table>
                <tbody><tr><td>BENG 202</td><td>4</td></tr></tbody>
                <tfoot><tr><td>Total</td><td>4</td></tr></tfoot>
            </table>",
        )
        .unwrap();
        assert!(out.find("BENG 202").unwrap() < out.find("Total").unwrap());
    }
}
