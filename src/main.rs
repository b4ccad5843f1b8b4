use ahadd::app::{handle_fatal_error, init_logging, AppConfig};
use ahadd::cli::{execute, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let app_config = AppConfig::new(cli.verbose, cli.quiet);
    init_logging(&app_config);

    if let Err(e) = execute(cli).await {
        handle_fatal_error(e, app_config.verbose);
    }
}
