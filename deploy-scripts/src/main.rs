use clap::Parser;
use deploy_scripts::{cli::Cli, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    cli.run().await
}
