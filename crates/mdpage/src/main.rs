//! mdpage CLI - render Markdown into self-contained HTML pages.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "mdpage")]
#[command(about = "Render Markdown into self-contained HTML pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to mdpage.toml config file
    #[arg(short, long, default_value = "mdpage.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default mdpage.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Render Markdown files to HTML
    Render {
        /// Input files or glob patterns
        inputs: Vec<String>,

        /// Single input file, overrides positional inputs
        #[arg(short, long)]
        input: Option<String>,

        /// Concatenate all inputs into this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Render into a preview directory and serve with live reload
    Serve {
        /// Input files or glob patterns
        inputs: Vec<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,

        #[command(flatten)]
        page: PageArgs,
    },
}

/// Page flags shared by `render` and `serve`. Each one overrides the
/// matching `[render]` setting when given.
#[derive(Args, Debug, Default)]
pub struct PageArgs {
    /// Embed local images as base64 data URIs
    #[arg(short, long)]
    embed: bool,

    /// Add a table of contents
    #[arg(short, long)]
    toc: bool,

    /// Render ```math blocks with MathJax
    #[arg(short, long)]
    mathjax: bool,

    /// Favicon file to embed
    #[arg(short, long)]
    favicon: Option<PathBuf>,

    /// Enable table row/column spans
    #[arg(short, long)]
    span: bool,

    /// Custom stylesheet appended after the theme
    #[arg(long)]
    css: Option<PathBuf>,

    /// Skip CSS minification
    #[arg(long)]
    no_minify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Render {
            inputs,
            input,
            output,
            page,
        } => {
            let inputs = match input {
                Some(input) => vec![input],
                None => inputs,
            };
            commands::render::run(&cli.config, inputs, output, page).await?;
        }
        Commands::Serve {
            inputs,
            port,
            no_open,
            page,
        } => {
            commands::serve::run(&cli.config, inputs, port, !no_open, page).await?;
        }
    }

    Ok(())
}
