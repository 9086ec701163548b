// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, load config, build the API
//   client and hand it to the matching `Ui` handler.
// - Returns `anyhow::Result` so configuration problems are reported as a
//   readable error chain with a non-zero exit code.

use anyhow::Context;
use clap::Parser;
use dstn_check::api::ApiClient;
use dstn_check::cli::{Cli, Commands};
use dstn_check::config::{resolve_config_path, Config};
use dstn_check::ui::Ui;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = resolve_config_path(cli.config.as_deref());
    log::debug!("Using config {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let api = ApiClient::new(&config).context("Failed to build HTTP client")?;

    let mut ui = Ui::stdout();
    match cli.command {
        Commands::Single {
            student_name,
            degree_id,
            language,
        } => ui.handle_single(api, student_name, degree_id, language, cli.output_file.as_deref()),
        Commands::Multiple { file } => ui.handle_multiple(api, file, cli.output_file.as_deref()),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug for this crate with
/// `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "dstn_check=debug,warn" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
