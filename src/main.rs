//! Percipio catalog exporter CLI

use anyhow::Context;
use clap::Parser;
use percipio_catalog::cli::{Cli, Runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let runner = Runner::new(cli);

    runner.run().await.context("catalog export failed")?;
    Ok(())
}
