mod cli;

use std::io::Write;
use std::process::ExitCode;

use book_organizer::error::Result;
use book_organizer::prelude::*;
use clap::Parser;
use cli::Cli;
use log::error;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the run ended without doing what was asked
/// (cancelled, or some renames failed).
async fn run(args: Cli) -> Result<bool> {
    if let Some(directory) = &args.to_cbz {
        return to_cbz(&args, directory).await;
    }

    let config = args.to_config(args.directory.clone())?;
    let analysis = config.analyze().await?;
    print_preview(&config, &analysis);

    if analysis.plan.is_empty() {
        println!("No image files to organize.");
        return Ok(true);
    }

    if args.dry_run {
        println!("Dry run: no files were changed.");
        return Ok(true);
    }

    let needs_renaming = !analysis.plan.is_identity();
    if !needs_renaming && !args.cbz {
        println!("Already organized, nothing to do.");
        return Ok(true);
    }

    if !args.auto && !confirm("Apply these changes? [y/N]: ").await? {
        println!("Cancelled.");
        return Ok(false);
    }

    let report = config.apply(&analysis.plan).await?;
    print_report(&report);
    if !report.is_success() {
        return Ok(false);
    }

    if args.cbz {
        let archive = config.create_archive(&analysis.plan).await?;
        println!("Created {}", archive.display());
    }

    Ok(true)
}

async fn to_cbz(args: &Cli, directory: &Path) -> Result<bool> {
    let config = args.to_config(directory.to_path_buf())?;

    if args.dry_run {
        let images = Collector::new(directory)
            .collect_images()
            .await?;
        println!(
            "Dry run: would pack {} image(s) from {}",
            images.len(),
            directory.display()
        );
        for image in &images {
            println!("  {}", book_organizer::path_utils::get_file_name_lossy(image));
        }
        return Ok(true);
    }

    let archive = config.archive_directory(directory).await?;
    println!("Created {}", archive.display());
    Ok(true)
}

fn print_preview(config: &OrganizerConfig, analysis: &Analysis) {
    println!("Directory: {}", config.target_path.display());
    println!();

    if !analysis.notices.is_empty() {
        println!("Notes:");
        for notice in &analysis.notices {
            println!("  {}", notice);
        }
        println!();
    }

    if !analysis.skipped.is_empty() {
        println!("Skipped:");
        for skipped in &analysis.skipped {
            println!("  {} ({})", skipped.file, skipped.reason);
        }
        println!();
    }

    if !analysis.plan.is_empty() {
        println!("Plan:");
        for entry in &analysis.plan {
            if entry.is_identity() {
                println!("  {} (unchanged)", entry.source);
            } else {
                println!("  {} -> {}", entry.source, entry.target);
            }
        }
        println!();
    }
}

fn print_report(report: &ExecutionReport) {
    println!(
        "Renamed {} file(s), {} already in place.",
        report.applied.len(),
        report.unchanged.len()
    );
    if !report.failed.is_empty() {
        println!("Failed:");
        for failed in &report.failed {
            println!(
                "  {} -> {}: {}",
                failed.entry.source, failed.entry.target, failed.error
            );
        }
    }
}

async fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
