//! Fixed document boilerplate: preamble, chapter/section headings, closer.

use chrono::{DateTime, Utc};

use handbook_latex::{clean_text, escape_text, escape_url};
use handbook_shared::DocumentConfig;

/// The document preamble up to and including the table of contents.
pub fn preamble(doc: &DocumentConfig, generated_at: DateTime<Utc>) -> String {
    let site_label = doc.site_url.host_str().unwrap_or(doc.site_url.as_str());

    let mut tex = String::new();
    tex.push_str(&format!(
        "% Generated by handbook {} on {}\n",
        env!("CARGO_PKG_VERSION"),
        generated_at.to_rfc3339()
    ));
    tex.push_str("\\documentclass[12pt,titlepage]{book}\n");

    // packages
    tex.push_str("\\usepackage{adjustbox}\n");
    tex.push_str("\\usepackage[pagestyles]{titlesec}\n");
    tex.push_str("\\usepackage{hyperref}\n");

    // title page
    tex.push_str(&format!(
        "\\title{{\\textbf{{{}}}\\\\{}}}\n",
        clean_text(&doc.title),
        clean_text(&doc.subtitle)
    ));
    tex.push_str(&format!(
        "\\date{{Compiled: \\today\\\\~\\\\{}\\\\~\\\\\\href{{{}}}{{{}}}}}\n",
        clean_text(&doc.notice),
        escape_url(doc.site_url.as_str()),
        escape_text(site_label)
    ));

    // unnumbered chapter/section titles and a running head
    tex.push_str("\\titleformat{\\chapter}[display]{\\normalfont\\bfseries}{}{0pt}{\\Huge}\n");
    tex.push_str("\\newpagestyle{mystyle}\n");
    tex.push_str("{\\sethead[\\thepage][][\\textit{\\chaptertitle}]{}{}{\\thepage}}\n");
    tex.push_str("\\pagestyle{mystyle}\n");
    tex.push_str("\\titleformat{\\section}{\\normalfont\\Large\\bfseries}{}{0pt}{}\n");
    tex.push_str("\\titleformat{\\subsection}{\\normalfont\\large\\bfseries}{}{0pt}{}\n");

    tex.push_str("\\begin{document}\n");
    tex.push_str("\\maketitle\n");
    tex.push_str("\\begingroup\\let\\cleardoublepage\\clearpage\\tableofcontents\\endgroup\n");
    tex
}

/// `\chapter{...}` line.
pub fn chapter_heading(title: &str) -> String {
    format!("\\chapter{{{}}}\n", clean_text(title))
}

/// `\section{...}` line.
pub fn section_heading(title: &str) -> String {
    format!("\\section{{{}}}\n", clean_text(title))
}

/// Single-line LaTeX comment standing in for a section that failed to render.
pub fn skipped_notice(reason: &str) -> String {
    let reason = reason.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("% section skipped: {reason}\n\n")
}

/// Closes the document.
pub fn closer() -> &'static str {
    "\\end{document}\n"
}
