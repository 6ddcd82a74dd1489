//! End-to-end `build` pipeline: outline → fetch → render → `.tex` file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, instrument, warn};

use handbook_fetch::{PageFetcher, fetch_and_parse};
use handbook_latex::render_page;
use handbook_shared::{AppConfig, HandbookError, Result, Section, validate_config};

use crate::document;

/// Options for a single `build_handbook` run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Destination `.tex` file.
    pub output: PathBuf,
    /// Skip sections whose markup cannot be rendered instead of aborting.
    pub keep_going: bool,
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    /// Path of the written `.tex` file.
    pub output: PathBuf,
    /// Sections rendered in full.
    pub sections_rendered: usize,
    /// Sections replaced by a comment (section title, reason).
    pub sections_skipped: Vec<(String, String)>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a section's page is fetched.
    fn section_started(&self, title: &str, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn section_started(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Build the handbook described by `config` into `options.output`.
///
/// Chapters and sections are emitted in outline order. The document is
/// written to a temporary file next to the output and renamed into place
/// only when every section has been handled, so a failed run leaves any
/// previous output untouched.
#[instrument(skip_all, fields(output = %options.output.display()))]
pub async fn build_handbook<F: PageFetcher>(
    config: &AppConfig,
    fetcher: &F,
    options: &BuildOptions,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();
    validate_config(config)?;

    if let Some(parent) = options.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| HandbookError::io(parent, e))?;
    }

    let temp = temp_path(&options.output);
    let outcome = write_document(config, fetcher, options, &temp, progress).await;

    let (sections_rendered, sections_skipped) = match outcome {
        Ok(counts) => counts,
        Err(e) => {
            let _ = std::fs::remove_file(&temp);
            return Err(e);
        }
    };

    std::fs::rename(&temp, &options.output)
        .map_err(|e| HandbookError::io(&options.output, e))?;

    let report = BuildReport {
        output: options.output.clone(),
        sections_rendered,
        sections_skipped,
        elapsed: start.elapsed(),
    };

    info!(
        rendered = report.sections_rendered,
        skipped = report.sections_skipped.len(),
        duration_ms = report.elapsed.as_millis(),
        "handbook written"
    );
    progress.done(&report);

    Ok(report)
}

/// Stream the whole document into `temp`.
async fn write_document<F: PageFetcher>(
    config: &AppConfig,
    fetcher: &F,
    options: &BuildOptions,
    temp: &Path,
    progress: &dyn ProgressReporter,
) -> Result<(usize, Vec<(String, String)>)> {
    let file = File::create(temp).map_err(|e| HandbookError::io(temp, e))?;
    let mut sink = Sink {
        path: temp,
        writer: BufWriter::new(file),
    };

    let outline = config.outline();
    let total = outline.section_count();
    let mut current = 0;
    let mut rendered = 0;
    let mut skipped = Vec::new();

    progress.phase("Writing preamble");
    sink.write(&document::preamble(&config.document, Utc::now()))?;

    for chapter in &outline.chapters {
        info!(chapter = %chapter.title, sections = chapter.sections.len(), "writing chapter");
        sink.write(&document::chapter_heading(&chapter.title))?;

        for section in &chapter.sections {
            current += 1;
            progress.section_started(&section.title, current, total);
            sink.write(&document::section_heading(&section.title))?;

            match render_section(fetcher, section).await {
                Ok(body) => {
                    sink.write(&body)?;
                    rendered += 1;
                }
                Err(e) if options.keep_going && is_skippable(&e) => {
                    warn!(section = %section.title, url = %section.url, error = %e, "skipping section");
                    sink.write(&document::skipped_notice(&e.to_string()))?;
                    skipped.push((section.title.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }
    }

    sink.write(document::closer())?;
    sink.flush()?;

    Ok((rendered, skipped))
}

/// Fetch and render one section into a fresh buffer.
async fn render_section<F: PageFetcher>(fetcher: &F, section: &Section) -> Result<String> {
    let doc = fetch_and_parse(fetcher, &section.url).await?;
    let mut out = String::new();
    render_page(&section.url, &doc, &section.selector, &mut out)?;
    Ok(out)
}

/// Content problems may be skipped; network and I/O failures may not.
fn is_skippable(err: &HandbookError) -> bool {
    err.is_unsupported_markup() || matches!(err, HandbookError::Parse { .. })
}

/// `dir/.main.tex.tmp` for `dir/main.tex`.
fn temp_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "handbook.tex".to_string());
    output.with_file_name(format!(".{name}.tmp"))
}

/// Append-only output sink.
struct Sink<'p> {
    path: &'p Path,
    writer: BufWriter<File>,
}

impl Sink<'_> {
    fn write(&mut self, fragment: &str) -> Result<()> {
        self.writer
            .write_all(fragment.as_bytes())
            .map_err(|e| HandbookError::io(self.path, e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| HandbookError::io(self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handbook_fetch::HttpFetcher;
    use handbook_shared::{Chapter, ContentSelector, FetchConfig};
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "handbook-build-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn section(server: &MockServer, title: &str, route: &str) -> Section {
        Section {
            title: title.into(),
            url: Url::parse(&format!("{}{route}", server.uri())).unwrap(),
            selector: ContentSelector::default(),
        }
    }

    fn config(chapters: Vec<Chapter>) -> AppConfig {
        AppConfig {
            chapters,
            ..AppConfig::default()
        }
    }

    async fn mount(server: &MockServer, route: &str, field_html: &str) {
        let body = format!(
            r#"<html><body><div id="nav">menu</div><div class="field">{field_html}</div></body></html>"#
        );
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn builds_chapters_and_sections_in_order() {
        let server = MockServer::start().await;
        mount(&server, "/node/1", "<p>Mission text</p>").await;
        mount(&server, "/node/2", "<ul><li>Rule A</li><li>Rule B</li></ul>").await;
        mount(&server, "/node/3", r#"<p>See <a href="/node/1">mission</a></p>"#).await;

        let config = config(vec![
            Chapter {
                title: "Introduction".into(),
                sections: vec![
                    section(&server, "Mission Statement", "/node/1"),
                    section(&server, "Rules", "/node/2"),
                ],
            },
            Chapter {
                title: "Resources".into(),
                sections: vec![section(&server, "Links", "/node/3")],
            },
        ]);

        let dir = temp_dir("order");
        let options = BuildOptions {
            output: dir.join("main.tex"),
            keep_going: false,
        };
        let report = build_handbook(&config, &fetcher(), &options, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.sections_rendered, 3);
        assert!(report.sections_skipped.is_empty());

        let tex = std::fs::read_to_string(&options.output).unwrap();
        let link = format!("\\href{{{}/node/1}}{{mission}}", server.uri());
        let needles: [&str; 11] = [
            "\\begin{document}",
            "\\chapter{Introduction}",
            "\\section{Mission Statement}",
            "Mission text",
            "\\section{Rules}",
            "\\item Rule A",
            "\\item Rule B",
            "\\chapter{Resources}",
            "\\section{Links}",
            link.as_str(),
            "\\end{document}",
        ];
        let positions: Vec<usize> = needles
            .iter()
            .map(|n| tex.find(n).unwrap_or_else(|| panic!("missing {n}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!tex.contains("menu"));
        assert!(tex.ends_with("\\end{document}\n"));
        assert!(!temp_path(&options.output).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unsupported_markup_aborts_and_keeps_previous_output() {
        let server = MockServer::start().await;
        mount(&server, "/ok", "<p>fine</p>").await;
        mount(&server, "/bad", "<span>surprise</span>").await;

        let config = config(vec![Chapter {
            title: "Intro".into(),
            sections: vec![section(&server, "Ok", "/ok"), section(&server, "Bad", "/bad")],
        }]);

        let dir = temp_dir("abort");
        std::fs::create_dir_all(&dir).unwrap();
        let options = BuildOptions {
            output: dir.join("main.tex"),
            keep_going: false,
        };
        std::fs::write(&options.output, "previous build").unwrap();

        let err = build_handbook(&config, &fetcher(), &options, &SilentProgress)
            .await
            .unwrap_err();
        assert!(err.is_unsupported_markup());

        assert_eq!(std::fs::read_to_string(&options.output).unwrap(), "previous build");
        assert!(!temp_path(&options.output).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn keep_going_skips_unrenderable_sections() {
        let server = MockServer::start().await;
        mount(&server, "/bad", "<p>half</p><iframe></iframe>").await;
        mount(&server, "/ok", "<p>fine</p>").await;
        Mock::given(path("/other"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>no field</p>"))
            .mount(&server)
            .await;

        let config = config(vec![Chapter {
            title: "Intro".into(),
            sections: vec![
                section(&server, "Bad", "/bad"),
                section(&server, "Other", "/other"),
                section(&server, "Ok", "/ok"),
            ],
        }]);

        let dir = temp_dir("keep-going");
        let options = BuildOptions {
            output: dir.join("main.tex"),
            keep_going: true,
        };
        let report = build_handbook(&config, &fetcher(), &options, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.sections_rendered, 1);
        assert_eq!(report.sections_skipped.len(), 2);
        assert_eq!(report.sections_skipped[0].0, "Bad");
        assert_eq!(report.sections_skipped[1].0, "Other");

        let tex = std::fs::read_to_string(&options.output).unwrap();
        // A failed section contributes nothing but the notice.
        assert!(!tex.contains("half"));
        assert!(tex.contains("% section skipped: unsupported markup <iframe>"));
        assert!(tex.contains("fine"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn network_errors_stay_fatal_with_keep_going() {
        let server = MockServer::start().await;
        Mock::given(path("/gone"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = config(vec![Chapter {
            title: "Intro".into(),
            sections: vec![section(&server, "Gone", "/gone")],
        }]);

        let dir = temp_dir("network");
        let options = BuildOptions {
            output: dir.join("main.tex"),
            keep_going: true,
        };
        let err = build_handbook(&config, &fetcher(), &options, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, HandbookError::Network(_)));
        assert!(!options.output.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_path(Path::new("out/main.tex")),
            PathBuf::from("out/.main.tex.tmp")
        );
    }
}
