use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Point;

/// Outline tables on scanned pages and review their OCR transcriptions.
#[derive(Debug, Parser)]
#[command(name = "table-annotator", about, version)]
pub struct Cli {
    /// Backend base URL, overriding the configured one
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay recorded pointer and keyboard events on a page
    Replay(ReplayArgs),

    /// Load the OCR correction view and print its items
    Ocr {
        /// JSON list of local edits to apply before printing
        #[arg(long)]
        edits: Option<PathBuf>,
    },

    /// Cut every table cell out of a page image
    Cells {
        /// Page image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Table records as printed by `replay`
        #[arg(value_name = "TABLES")]
        tables: PathBuf,

        /// Output directory
        #[arg(long)]
        out: PathBuf,

        /// Skip these rows of every table (e.g. a header row)
        #[arg(long, value_delimiter = ',')]
        drop_rows: Vec<usize>,

        /// Skip these columns of every table
        #[arg(long, value_delimiter = ',')]
        drop_columns: Vec<usize>,
    },

    /// Print the effective configuration
    Config {
        /// Also write it back, creating the file with defaults if needed
        #[arg(long)]
        save: bool,
    },

    /// List the backend's page images
    Images {
        /// Current route; its first segment names the data directory
        #[arg(long, default_value = "/")]
        route: String,
    },
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON lines script of events
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Page image name as known to the backend
    #[arg(long)]
    pub image: Option<String>,

    /// Local copy of the page image, used for size, row prediction and
    /// previews
    #[arg(long)]
    pub image_file: Option<PathBuf>,

    /// Screen position of the page image's top-left corner
    #[arg(long, value_parser = parse_position, default_value = "0,0")]
    pub position: Point,

    /// Start from the tables saved on the backend
    #[arg(long)]
    pub load: bool,

    /// Store the resulting tables on the backend
    #[arg(long)]
    pub save: bool,

    /// Write the page with the table overlay to this PNG
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

fn parse_position(raw: &str) -> Result<Point, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {raw:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|err| format!("invalid coordinate {v:?}: {err}"))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("100,50"), Ok(Point::new(100.0, 50.0)));
        assert_eq!(parse_position(" 1.5 , -2 "), Ok(Point::new(1.5, -2.0)));
        assert!(parse_position("100").is_err());
        assert!(parse_position("a,b").is_err());
    }

    #[test]
    fn test_replay_args() {
        let cli = Cli::try_parse_from([
            "table-annotator",
            "replay",
            "events.jsonl",
            "--image",
            "p1.jpg",
            "--position",
            "100,50",
            "--backend-url",
            "http://localhost:9000",
        ])
        .unwrap();
        assert_eq!(cli.backend_url.as_deref(), Some("http://localhost:9000"));
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.position, Point::new(100.0, 50.0));
        assert!(!args.load);
    }

    #[test]
    fn test_cells_lists() {
        let cli = Cli::try_parse_from([
            "table-annotator",
            "cells",
            "p1.png",
            "tables.json",
            "--out",
            "cells",
            "--drop-rows",
            "0,1",
        ])
        .unwrap();
        let Commands::Cells { drop_rows, drop_columns, .. } = cli.command else {
            panic!("expected cells");
        };
        assert_eq!(drop_rows, vec![0, 1]);
        assert!(drop_columns.is_empty());
    }
}
