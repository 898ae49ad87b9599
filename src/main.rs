// src/main.rs
// =============================================================================
// Entry point of the gistapi binary.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, filtered by RUST_LOG or --verbose)
// 3. Build a GistClient and dispatch to the subcommand handler
// 4. Print the result as text or JSON
// 5. Exit with 0 on success, 2 on any error
// =============================================================================

mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use gistapi::{fetch_by_user, Gist, GistClient, GistFiles, GistMetadata};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins unless --verbose was given; quiet by default.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("gistapi=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let client = GistClient::builder()
        .base_url(&cli.base_url)
        .timeout(Duration::from_secs(cli.timeout))
        .build()
        .context("could not set up the HTTP client")?;

    match cli.command {
        Commands::Show { id, files, json } => handle_show(&client, &id, files, json).await,
        Commands::User { username, json } => handle_user(&client, &username, json).await,
    }
}

// What we print for one gist in --json mode
#[derive(Serialize)]
struct GistReport<'a> {
    id: &'a str,
    url: &'a str,
    embed_url: &'a str,
    json_url: &'a str,
    #[serde(flatten)]
    metadata: &'a GistMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    contents: Option<GistFiles>,
}

async fn report<'a>(gist: &'a Gist, with_files: bool) -> Result<GistReport<'a>> {
    let metadata = gist.metadata().await?;
    let contents = if with_files {
        Some(gist.files().await?)
    } else {
        None
    };

    Ok(GistReport {
        id: gist.id(),
        url: gist.url(),
        embed_url: gist.embed_url(),
        json_url: gist.json_url(),
        metadata,
        contents,
    })
}

async fn handle_show(client: &GistClient, id: &str, with_files: bool, json: bool) -> Result<()> {
    let gist = Gist::from_id(client, id);
    let report = report(&gist, with_files)
        .await
        .with_context(|| format!("could not fetch gist {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn handle_user(client: &GistClient, username: &str, json: bool) -> Result<()> {
    let gists = fetch_by_user(client, username)
        .await
        .with_context(|| format!("could not list gists for {}", username))?;

    // Listing entries already carry metadata, so none of this hits the network.
    let mut reports = Vec::with_capacity(gists.len());
    for gist in &gists {
        reports.push(report(gist, false).await?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("{} has no public gists", username);
        return Ok(());
    }

    println!("{:<24} {:<28} {}", "ID", "CREATED", "DESCRIPTION");
    println!("{}", "=".repeat(80));
    for r in &reports {
        println!(
            "{:<24} {:<28} {}",
            r.id,
            r.metadata.created_at,
            r.metadata.description.as_deref().unwrap_or("")
        );
    }
    println!();
    println!("{} gist(s)", reports.len());
    Ok(())
}

fn print_report(report: &GistReport<'_>) {
    let meta = report.metadata;
    println!("id:          {}", report.id);
    println!("owner:       {}", meta.owner);
    println!("description: {}", meta.description.as_deref().unwrap_or(""));
    println!("created:     {}", meta.created_at);
    println!("public:      {}", meta.public);
    println!("url:         {}", report.url);
    println!("embed:       {}", report.embed_url);
    println!("files:       {}", meta.filenames.join(", "));

    if let Some(files) = &report.contents {
        for (name, content) in files.iter() {
            println!();
            println!("--- {} ---", name);
            println!("{}", content);
        }
    }
}
