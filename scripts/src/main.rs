use aggregator_scripts::{
    artifacts::ArtifactStore,
    cli::{Cli, Context},
    config::Config,
    errors::ScriptError,
};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // A missing `.env` file is fine, the environment may be set directly
    let _ = dotenvy::dotenv();

    let Cli {
        config,
        network,
        priv_key,
        artifacts,
        command,
    } = Cli::parse();

    // Logs go to stderr, stdout carries only the report
    tracing_subscriber::fmt()
        .pretty()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(config.as_deref())?;
    let network = config.network(&network)?.clone();
    let ctx = Context {
        config,
        network,
        priv_key,
        artifacts: ArtifactStore::new(artifacts),
    };

    command.run(ctx).await.inspect_err(|e| error!("{}", e))
}
