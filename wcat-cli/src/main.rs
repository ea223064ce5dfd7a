// ABOUTME: Main entry point for the wcat preview client
// ABOUTME: Drives upload, download, and clear operations and maps failures to exit codes

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io::IsTerminal;
use tokio::io::AsyncReadExt;

use wcat_cli::cli::{Cli, Commands};
use wcat_cli::cli_output::CliOutput;
use wcat_cli::config::Config;
use wcat_cli::constants::exit_codes;
use wcat_cli::download::{Destination, Downloader};
use wcat_cli::error::TransferError;
use wcat_cli::source::{BodySource, TransferItem};
use wcat_cli::transcode::ResizeBounds;
use wcat_cli::transfer::{clear_previews, TransferOutcome, Uploader};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let use_color = !cli.no_color
        && std::env::var("NO_COLOR").is_err()
        && std::io::stderr().is_terminal();
    let out = CliOutput::with_color(use_color);

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            out.warning(&format!("ignoring config: {err:#}"));
            Config::default()
        }
    };

    let server = cli.server_url(&config);
    let client = reqwest::Client::new();

    match &cli.command {
        Some(Commands::Download { output, overwrite }) => {
            download(&out, client, &server, output, *overwrite).await;
        }
        Some(Commands::Clear) => {
            clear(&out, &client, &server).await;
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            wcat_cli::completions::write_completions(*shell, &mut cmd, &mut std::io::stdout())?;
        }
        None => {
            preview(&out, client, &server, &cli, cli.bounds(&config)).await;
        }
    }

    Ok(())
}

/// Default action: upload each file argument, or the buffered standard
/// input when no files are given. Items run and report in order; one
/// failure never stops the rest.
async fn preview(
    out: &CliOutput,
    client: reqwest::Client,
    server: &str,
    cli: &Cli,
    bounds: ResizeBounds,
) {
    let uploader = Uploader::new(client, server);

    if cli.files.is_empty() {
        out.status("Previewing from standard input ...");

        // the whole blob is buffered so sniffing can re-read it from the start
        let mut input = Vec::new();
        if let Err(err) = tokio::io::stdin().read_to_end(&mut input).await {
            out.error(&format!("failed reading stdin: {err}"));
            std::process::exit(exit_codes::STDIN_READ_FAILED);
        }

        let item = TransferItem::new("stdin", BodySource::from_bytes(input), bounds);
        report_upload(out, "stdin", uploader.upload(item, cli.justfile).await);
        return;
    }

    for path in &cli.files {
        let display = path.display().to_string();
        out.status(&format!("Preview file {display} ..."));

        let source = match BodySource::open(path).await {
            Ok(source) => source,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                out.error(&format!("file does not exist: {display}"));
                continue;
            }
            Err(err) => {
                out.error(&format!("cannot open {display}: {err}"));
                continue;
            }
        };

        let item = TransferItem::new(display.clone(), source, bounds);
        report_upload(out, &display, uploader.upload(item, cli.justfile).await);
    }
}

fn report_upload(
    out: &CliOutput,
    what: &str,
    result: std::result::Result<TransferOutcome, TransferError>,
) {
    match result {
        Ok(outcome) => out.outcome(what, &outcome),
        Err(err) => out.failure(&err),
    }
}

async fn download(
    out: &CliOutput,
    client: reqwest::Client,
    server: &str,
    output: &str,
    overwrite: bool,
) {
    let downloader = Downloader::new(client, server);

    let result = match Destination::parse(output) {
        Destination::Stdout => downloader.download_to_stdout().await.map(|()| None),
        Destination::File(path) => {
            out.status("Downloading latest file ...");
            downloader.download_to_file(&path, overwrite).await.map(Some)
        }
        Destination::Directory(dir) => {
            out.status("Downloading latest file ...");
            downloader
                .download_to_directory(&dir, overwrite)
                .await
                .map(Some)
        }
    };

    match result {
        Ok(Some(path)) => out.success(&path.display().to_string()),
        Ok(None) => {}
        Err(err) => {
            out.failure(&err);
            std::process::exit(1);
        }
    }
}

async fn clear(out: &CliOutput, client: &reqwest::Client, server: &str) {
    out.status("Sending message to clear previews ...");

    match clear_previews(client, server).await {
        Ok(outcome) if outcome.success => out.success("Previews cleared"),
        Ok(outcome) => {
            out.outcome("clear", &outcome);
            std::process::exit(exit_codes::CLEAR_FAILED);
        }
        Err(err) => {
            out.failure(&err);
            std::process::exit(exit_codes::CLEAR_FAILED);
        }
    }
}
