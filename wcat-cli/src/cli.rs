// ABOUTME: CLI argument definitions for the wcat preview client
// ABOUTME: Defines the default preview action and subcommands using clap derive macros

use crate::config::Config;
use crate::constants::defaults;
use crate::transcode::ResizeBounds;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wcat")]
#[command(about = "Send FILE(s) to be previewed in a browser.", long_about = None)]
#[command(after_help = "With no FILE(s), read from standard input.")]
#[command(version)]
pub struct Cli {
    /// Post previews to this server
    #[arg(short, long, global = true, env = "WCATSERVER", value_name = "URL")]
    pub server: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Files to preview; standard input is read when none are given
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Max width for images; 0 for no max width
    #[arg(long = "maxwidth", visible_alias = "mw", value_name = "PIXELS")]
    pub max_width: Option<u32>,

    /// Max height for images; 0 for no max height
    #[arg(long = "maxheight", visible_alias = "mh", value_name = "PIXELS")]
    pub max_height: Option<u32>,

    /// Disable maxwidth and maxheight; shorthand for --maxwidth 0 --maxheight 0
    #[arg(long)]
    pub nomax: bool,

    /// Don't preview/process the file; just upload it as-is for download
    #[arg(short = 'j', long)]
    pub justfile: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the latest file from the server
    #[command(visible_alias = "d")]
    Download {
        /// Location to download to: - for stdout, . or a trailing separator
        /// for a directory
        #[arg(
            short = 'O',
            long = "output-document",
            default_value = ".",
            value_name = "LOCATION"
        )]
        output: String,

        /// Overwrite the output file if it exists
        #[arg(long, visible_alias = "ow")]
        overwrite: bool,
    },
    /// Clear previews on the server
    #[command(visible_alias = "c")]
    Clear,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: crate::completions::Shell,
    },
}

impl Cli {
    /// Effective server base URL: flag or environment, then config file,
    /// then the built-in default.
    pub fn server_url(&self, config: &Config) -> String {
        self.server
            .clone()
            .or_else(|| config.server.clone())
            .unwrap_or_else(|| defaults::SERVER_URL.to_string())
    }

    /// Effective image bounds after `--nomax` and config fallback.
    pub fn bounds(&self, config: &Config) -> ResizeBounds {
        if self.nomax {
            return ResizeBounds::UNBOUNDED;
        }
        ResizeBounds::new(
            self.max_width
                .or(config.max_width)
                .unwrap_or(defaults::MAX_WIDTH),
            self.max_height
                .or(config.max_height)
                .unwrap_or(defaults::MAX_HEIGHT),
        )
    }
}
