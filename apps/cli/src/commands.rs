//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use reportforge_core::{
    GenerateConfig, ProgressReporter, StageState, generate_report, refine_page,
};
use reportforge_fetch::{Collector, CollectorConfig, RetryPolicy};
use reportforge_generator::{GenerationClient, GeneratorConfig};
use reportforge_shared::{AppConfig, init_config, load_config, resolve_api_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ReportForge — turn repository docs into a paginated report.
#[derive(Parser)]
#[command(
    name = "reportforge",
    version,
    about = "Generate a paginated project report from a repository's markdown documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

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
    /// Generate a report from a repository's markdown documents.
    Generate {
        /// Repository locator: owner/repo or a github.com URL.
        locator: String,

        /// Requested page ceiling (a floor of 5 pages always applies).
        #[arg(short, long)]
        max_pages: Option<usize>,

        /// Path to a report template file.
        #[arg(short, long)]
        template: Option<String>,

        /// Extra free-form instructions for the generation service.
        #[arg(short, long)]
        extra: Option<String>,

        /// Output directory for the generated pages.
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Revise one page of a generated report based on free-text feedback.
    Refine {
        /// Directory holding a previously generated report (page-*.md).
        dir: String,

        /// Free-text feedback describing the desired change.
        #[arg(short, long)]
        feedback: String,
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

    let filter = match cli.verbose {
        0 => "reportforge=info",
        1 => "reportforge=debug",
        _ => "reportforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            locator,
            max_pages,
            template,
            extra,
            out,
        } => {
            cmd_generate(
                &locator,
                max_pages,
                template.as_deref(),
                extra.as_deref(),
                out.as_deref(),
            )
            .await
        }
        Command::Refine { dir, feedback } => cmd_refine(&dir, &feedback).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

async fn cmd_generate(
    locator: &str,
    max_pages: Option<usize>,
    template: Option<&str>,
    extra: Option<&str>,
    out: Option<&str>,
) -> Result<()> {
    let config = load_config()?;
    let api_key = resolve_api_key(&config)?;

    let template_text = match template {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read template '{path}': {e}"))?,
        ),
        None => None,
    };

    let out_dir = PathBuf::from(out.unwrap_or(&config.defaults.output_dir));

    let collector = Collector::new(CollectorConfig {
        api_base: config.fetch.api_base.clone(),
        extension: config.defaults.extension.clone(),
        retry: RetryPolicy {
            max_attempts: config.fetch.max_attempts,
            base_delay: config.fetch.base_delay(),
        },
    })?;

    let generator = GenerationClient::new(GeneratorConfig {
        base_url: config.openrouter.base_url.clone(),
        api_key,
        api_key_env: config.openrouter.api_key_env.clone(),
        model: config.openrouter.model.clone(),
    })?;

    let generate_config = GenerateConfig {
        locator: locator.to_string(),
        max_pages: max_pages.unwrap_or(config.defaults.max_pages),
        template: template_text,
        extra_instructions: extra.map(String::from),
        call_timeout: config.fetch.call_timeout(),
    };

    info!(
        locator,
        max_pages = generate_config.max_pages,
        "generating report"
    );

    let reporter = CliProgress::new();
    let outcome = generate_report(&generate_config, &collector, &generator, &reporter).await;
    reporter.finish();

    if let Some(stage_error) = outcome.state.stage_error() {
        return Err(eyre!(
            "{} failed: {}",
            stage_error.stage.label(),
            stage_error.error
        ));
    }
    let report = outcome
        .report
        .ok_or_else(|| eyre!("pipeline finished without a report"))?;

    write_pages(&out_dir, &report.pages, &report.report)?;

    println!();
    println!("  Report generated successfully!");
    println!("  Run:    {}", report.run_id);
    println!("  Pages:  {}", report.pages.len());
    println!("  Files:  {}", report.source_files);
    println!("  Path:   {}", out_dir.display());
    println!("  Time:   {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// Write the raw report plus one file per page into `out_dir`.
fn write_pages(out_dir: &Path, pages: &[String], report: &str) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| eyre!("cannot create '{}': {e}", out_dir.display()))?;

    std::fs::write(out_dir.join("report.md"), report)
        .map_err(|e| eyre!("cannot write report.md: {e}"))?;

    for (idx, page) in pages.iter().enumerate() {
        let name = page_file_name(idx);
        std::fs::write(out_dir.join(&name), page)
            .map_err(|e| eyre!("cannot write {name}: {e}"))?;
    }

    Ok(())
}

/// `page-01.md`, `page-02.md`, … (1-indexed for display).
fn page_file_name(index: usize) -> String {
    format!("page-{:02}.md", index + 1)
}

// ---------------------------------------------------------------------------
// refine
// ---------------------------------------------------------------------------

async fn cmd_refine(dir: &str, feedback: &str) -> Result<()> {
    let config = load_config()?;
    let api_key = resolve_api_key(&config)?;

    let mut page_paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| eyre!("cannot read '{dir}': {e}"))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("page-") && n.ends_with(".md"))
        })
        .collect();
    page_paths.sort();

    if page_paths.is_empty() {
        return Err(eyre!("no page-*.md files found in '{dir}'"));
    }

    let mut pages = Vec::with_capacity(page_paths.len());
    for path in &page_paths {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
        pages.push(content);
    }

    let generator = GenerationClient::new(GeneratorConfig {
        base_url: config.openrouter.base_url.clone(),
        api_key,
        api_key_env: config.openrouter.api_key_env.clone(),
        model: config.openrouter.model.clone(),
    })?;

    info!(dir, pages = pages.len(), "refining report page");

    let refined = refine_page(&pages, feedback, &generator, config.fetch.call_timeout()).await?;

    let target_path = &page_paths[refined.target.page_index];
    std::fs::write(target_path, &refined.revised)
        .map_err(|e| eyre!("cannot write '{}': {e}", target_path.display()))?;

    println!();
    println!("  Page revised!");
    println!("  Page:     {}", refined.target.page_index + 1);
    println!("  Keywords: {}", refined.target.keywords.join(", "));
    println!("  Path:     {}", target_path.display());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner-backed progress reporter for generation runs.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn stage_changed(&self, state: &StageState) {
        self.spinner.set_message(format!(
            "[{:>3}%] {}: {}",
            state.progress_percent(),
            state.current_stage().label(),
            state.message()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_file_names_are_one_indexed() {
        assert_eq!(page_file_name(0), "page-01.md");
        assert_eq!(page_file_name(9), "page-10.md");
    }
}
