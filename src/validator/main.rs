//! Standalone validator for ad catalog files.
//!
//! Checks that every entry of the catalog is a unique http(s) URL and
//! shows which users would see which ad.

use std::process::ExitCode;

use clap::Parser;

use ad_rewards_bot::config::AdCatalog;

/// Ad catalog validator.
#[derive(Parser, Debug)]
#[command(name = "validate_ads")]
#[command(about = "Validates ad catalog files for the ad rewards bot")]
#[command(version)]
struct Args {
    /// Path to the JSON ad catalog to validate.
    #[arg(short, long, default_value = "ads.json")]
    file: String,

    /// Generate an example catalog at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Show every ad and its rotation slot.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    validate_catalog(&args.file, args.verbose)
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = AdCatalog::example();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example ad catalog written to: {output_path}");
            println!("\nThe file contains {} placeholder ads.", example.len());
            println!("Replace them with your own links before starting the bot.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_catalog(path: &str, verbose: bool) -> ExitCode {
    println!("Validating: {path}\n");

    let catalog = match AdCatalog::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load ad catalog: {e}");
            return ExitCode::FAILURE;
        }
    };

    let results = catalog.validate_all();
    let mut errors = 0;

    for (i, result) in results.iter().enumerate() {
        if verbose && let Some(url) = catalog.ads.get(i) {
            println!("[{i}] {} (users with id mod {} == {i})", truncate(url, 60), catalog.len());
        }

        match result {
            Ok(()) => {
                if verbose {
                    println!("  ✓ OK");
                }
            }
            Err(e) => {
                errors += 1;
                println!("  ✗ Error: {e}");
            }
        }
    }

    println!();

    let total = catalog.len();

    if errors == 0 {
        println!("✓ All {total} ads are valid!");
        ExitCode::SUCCESS
    } else {
        println!("✗ Validation failed: {errors} error(s) in {total} ads");
        println!("  Valid: {}/{total}", total.saturating_sub(errors));
        ExitCode::FAILURE
    }
}

/// Truncates a string for display.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
