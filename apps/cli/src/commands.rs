//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use cvscreen_core::{
    AgentRuntime, ScreeningAgent, ScreeningPolicy, ScreeningProgress, Toolbox, render_response,
};
use cvscreen_shared::{AppConfig, ToolName, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

const BANNER: &str = "Recruiter Agent Activated...";
const PROMPT: &str = "Which CV you want to process? ";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// cvscreen: screen a resume against its GitHub profile.
#[derive(Parser)]
#[command(
    name = "cvscreen",
    version,
    about = "Screen a PDF resume by verifying the candidate's GitHub profile.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.cvscreen/cvscreen.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Candidate database path (overrides `defaults.db_path`).
    #[arg(long, env = "CVSCREEN_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands. Without one, a resume is screened interactively.
#[derive(Subcommand)]
pub(crate) enum Command {
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
///
/// Logs go to stderr so the prompt and the summary stay readable on stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "cvscreen=warn",
        1 => "cvscreen=info",
        2 => "cvscreen=debug",
        _ => "cvscreen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;
    match cli.command {
        None => cmd_screen(&config, cli.db.as_deref()).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
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

/// The database path: `--db` wins over the configured default.
fn resolve_db_path(config: &AppConfig, db: Option<&Path>) -> PathBuf {
    db.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.db_path))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_screen(config: &AppConfig, db: Option<&Path>) -> Result<()> {
    println!("{BANNER}");
    let query = prompt_line(PROMPT)?;
    if query.trim().is_empty() {
        return Err(eyre!("no CV given"));
    }

    let db_path = resolve_db_path(config, db);
    info!(db = %db_path.display(), "opening candidate store");
    let toolbox = Toolbox::open(config, &db_path).await?;

    // The spinner is cleared when the agent drops, before the summary prints.
    let response = {
        let agent = ScreeningAgent::new(toolbox, ScreeningPolicy::from(config))
            .with_progress(Box::new(CliProgress::new()));
        let request = agent.request(&query);
        agent.invoke(&request).await?
    };

    println!("{}", render_response(&response));
    Ok(())
}

/// Print `prompt` and read one line from stdin, without the line ending.
fn prompt_line(prompt: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
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
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ScreeningProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn tool_called(&self, tool: ToolName) {
        self.spinner.println(format!("  -> {tool}"));
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_screening() {
        let cli = Cli::try_parse_from(["cvscreen"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.log_format, LogFormat::Text));
    }

    #[test]
    fn global_flags_parse() {
        let cli = Cli::try_parse_from([
            "cvscreen",
            "-vv",
            "--log-format",
            "json",
            "--db",
            "/tmp/candidates.db",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert_eq!(cli.db.as_deref(), Some(Path::new("/tmp/candidates.db")));
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::try_parse_from(["cvscreen", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));
    }

    #[test]
    fn db_flag_overrides_config() {
        let config = AppConfig::default();
        assert_eq!(resolve_db_path(&config, None), PathBuf::from("cv_table.db"));
        assert_eq!(
            resolve_db_path(&config, Some(Path::new("other.db"))),
            PathBuf::from("other.db")
        );
    }
}
