mod app;
mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use app::App;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "percept=debug,percept_experiment=debug"
    } else {
        "percept=info,percept_experiment=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::new(cli.config.as_deref())?;
    app.run(cli.command)?;

    Ok(())
}
