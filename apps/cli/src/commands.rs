//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use handbook_core::{BuildOptions, BuildReport, ProgressReporter};
use handbook_fetch::{HttpFetcher, fetch_and_parse};
use handbook_shared::{AppConfig, ContentSelector, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Handbook: turn a website's pages into one LaTeX document.
#[derive(Parser)]
#[command(
    name = "handbook",
    version,
    about = "Build a LaTeX handbook from the content of a website's pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.handbook/handbook.toml.
    #[arg(long, global = true, env = "HANDBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch every configured section and write the .tex document.
    Build {
        /// Output file (defaults to [output].path).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Run the LaTeX compiler on the result.
        #[arg(long)]
        compile: bool,

        /// Replace sections with unrenderable markup by a comment instead of aborting.
        #[arg(long)]
        keep_going: bool,
    },

    /// Render a single page and print its LaTeX to stdout.
    Render {
        /// Page URL.
        url: String,

        /// Content selector: `tag.class`, or `*` for the whole body.
        #[arg(short, long, default_value = "div.field")]
        selector: String,
    },

    /// Print the configured chapter and section order.
    Outline {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose)));

    // Logs go to stderr so `render` output stays clean on stdout.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "handbook=info",
        1 => "handbook=debug",
        _ => "handbook=trace",
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build {
            out,
            compile,
            keep_going,
        } => cmd_build(config_path, out, compile, keep_going).await,
        Command::Render { url, selector } => cmd_render(config_path, &url, &selector).await,
        Command::Outline { json } => cmd_outline(config_path, json),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(
    config_path: Option<&Path>,
    out: Option<PathBuf>,
    compile: bool,
    keep_going: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let output = out.unwrap_or_else(|| config.output.path.clone());

    info!(
        output = %output.display(),
        sections = config.outline().section_count(),
        keep_going,
        "building handbook"
    );

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let options = BuildOptions { output, keep_going };
    let reporter = CliProgress::new();

    let report = handbook_core::build_handbook(&config, &fetcher, &options, &reporter).await?;

    println!();
    println!("  Handbook written: {}", report.output.display());
    println!("  Sections: {}", report.sections_rendered);
    if !report.sections_skipped.is_empty() {
        println!("  Skipped:  {}", report.sections_skipped.len());
        for (title, reason) in &report.sections_skipped {
            println!("    - {title}: {}", first_line(reason));
        }
    }
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());

    if compile || config.output.compile {
        let pdf = handbook_core::compile(&report.output, &config.output.compiler)?;
        println!("  PDF:      {}", pdf.display());
    }
    println!();

    Ok(())
}

async fn cmd_render(config_path: Option<&Path>, url: &str, selector: &str) -> Result<()> {
    let config = resolve_config(config_path)?;
    let url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;
    let selector: ContentSelector = selector.parse()?;

    info!(%url, %selector, "rendering page");

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let doc = fetch_and_parse(&fetcher, &url).await?;

    let mut tex = String::new();
    handbook_latex::render_page(&url, &doc, &selector, &mut tex)?;
    print!("{tex}");
    Ok(())
}

fn cmd_outline(config_path: Option<&Path>, json: bool) -> Result<()> {
    let outline = resolve_config(config_path)?.outline();

    if json {
        println!("{}", serde_json::to_string_pretty(&outline)?);
        return Ok(());
    }

    for (i, chapter) in outline.chapters.iter().enumerate() {
        println!("{}. {}", i + 1, chapter.title);
        for (j, section) in chapter.sections.iter().enumerate() {
            println!("   {}.{} {}  <{}>", i + 1, j + 1, section.title, section.url);
        }
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn section_started(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {title}"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}

// A failed build never reaches `done`; stop ticking before the error report prints.
impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
