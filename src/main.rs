//! claude-plugin-validator - structural checks for a plugin marketplace

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use claude_plugin_validator::{RuleCategory, ValidatorConfig, run};
use tracing_subscriber::EnvFilter;

/// Validate plugin manifests, hooks, skills and the marketplace index
#[derive(Parser)]
#[command(name = "claude-plugin-validator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Show success and info diagnostics, and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every plugin under the root directory (default)
    Validate(ValidateArgs),
}

#[derive(Args, Default)]
struct ValidateArgs {
    /// Marketplace or plugin root directory [default: .]
    #[arg(short, long, env = "PLUGIN_VALIDATOR_ROOT")]
    root: Option<PathBuf>,

    /// Rule category to skip; repeat or comma-separate
    /// (also PLUGIN_VALIDATOR_SKIP)
    #[arg(long, value_delimiter = ',')]
    skip: Vec<RuleCategory>,

    /// Maximum number of plugins validated at once (also PLUGIN_VALIDATOR_JOBS)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Report a tool hook without "matcher" as an error instead of a warning
    /// (also PLUGIN_VALIDATOR_STRICT_MATCHER)
    #[arg(long)]
    strict_matcher: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Commands::Validate(args) = cli.command.unwrap_or(Commands::Validate(ValidateArgs::default()));
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_code(e.exit_code());
        }
    };
    if args.format == OutputFormat::Json {
        colored::control::set_override(false);
    }

    let report = match run(&config).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_code(e.exit_code());
        }
    };

    match args.format {
        OutputFormat::Text => print!("{}", report.render_text(cli.verbose)),
        OutputFormat::Json => match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                return exit_code(e.exit_code());
            }
        },
    }

    exit_code(report.exit_code())
}

/// Logs go to stderr so the report on stdout stays machine readable.
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Environment overrides are applied first so that flags win over them.
fn build_config(args: &ValidateArgs) -> claude_plugin_validator::Result<ValidatorConfig> {
    let mut config = ValidatorConfig::default()
        .with_env()?
        .disable_many(args.skip.iter().copied());
    if let Some(root) = &args.root {
        config = config.with_root(root.clone());
    }
    if let Some(jobs) = args.jobs {
        config = config.with_jobs(jobs);
    }
    if args.strict_matcher {
        config = config.with_strict_matcher(true);
    }
    Ok(config)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(2))
}
