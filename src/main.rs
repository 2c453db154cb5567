use clap::Parser;

use claude_switch::cli::{self, Cli};
use claude_switch::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli::run(cli).await
}
