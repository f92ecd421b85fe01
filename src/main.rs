use clap::Parser;
use github_authorized_keys::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve::run(config).await,
        Command::Sync => cli::sync::run(config).await,
        Command::Lookup { account } => cli::lookup::run(config, &account).await,
    }
}
