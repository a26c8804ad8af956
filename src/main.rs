use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use campus_admin::auth::{CredentialsFile, StaticToken, TokenSource};
use campus_admin::cli::{Cli, Commands};
use campus_admin::commands::{self, App};
use campus_admin::config::load_configuration;
use campus_admin::log::init_logging;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logging();

    let cli = Cli::parse();
    let settings = load_configuration(Path::new(&cli.config))?;

    let tokens: Arc<dyn TokenSource> = match &cli.token {
        Some(token) => Arc::new(StaticToken::new(token.clone())),
        None => Arc::new(CredentialsFile::new(settings.credentials_file.clone().into())),
    };

    let app = App::new(&settings, tokens)?;

    match cli.command {
        Commands::Academics { command } => commands::academics::run(&app, command).await?,
        Commands::Exams { command } => commands::exams::run(&app, command).await?,
        Commands::Students { command } => commands::students::run(&app, command).await?,
    }

    Ok(())
}
