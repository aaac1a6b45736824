mod backend;
mod cli;
mod commands;
mod config;
mod core;
mod domain;
mod ocr;
mod render;
mod replay;
mod session;
mod widget;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::config::AnnotatorConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AnnotatorConfig::load_from(path),
        None => AnnotatorConfig::load(),
    };
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }

    match cli.command {
        Commands::Replay(args) => commands::replay(config, args).await,
        Commands::Ocr { edits } => commands::ocr(config, edits.as_deref()).await,
        Commands::Cells {
            image,
            tables,
            out,
            drop_rows,
            drop_columns,
        } => commands::cells(&image, &tables, &out, &drop_rows, &drop_columns),
        Commands::Images { route } => commands::images(config, &route).await,
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                match &cli.config {
                    Some(path) => config.save_to(path)?,
                    None => config.save(),
                }
            }
            Ok(())
        }
    }
}
