//! k2region: CLI tool for looking up IPv4 addresses in an index file.

use clap::{Parser, Subcommand};
use k2region::xdb::loader;
use k2region::{CachePolicy, Searcher};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "k2region")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Offline IPv4 region lookups over an xdb index file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up IP addresses (reads one per line from stdin when none given)
    Search {
        /// Index file
        #[arg(short, long)]
        db: PathBuf,

        /// Cache policy: content, vector or file
        #[arg(short, long, default_value = "content")]
        policy: CachePolicy,

        /// Print the raw region string instead of the normalized record
        #[arg(long)]
        raw: bool,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,

        /// IP addresses to look up
        ips: Vec<String>,
    },

    /// Show the index header and verify the file structure
    Info {
        /// Index file
        #[arg(short, long)]
        db: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search {
            db,
            policy,
            raw,
            json,
            ips,
        } => search(&db, policy, raw, json, ips),
        Commands::Info { db, json } => info(&db, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn search(
    db: &Path,
    policy: CachePolicy,
    raw: bool,
    json: bool,
    ips: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let searcher = Searcher::open(db, policy)?;
    log::debug!("Loaded {:?} in {:?}", db, started.elapsed());

    let ips = if ips.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()?
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    } else {
        ips
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;

    for ip in &ips {
        let started = Instant::now();
        let region = match searcher.search(ip) {
            Ok(region) => region,
            Err(e) => {
                eprintln!("{}: {}", ip, e);
                failed += 1;
                continue;
            }
        };
        log::debug!("{} took {:?}", ip, started.elapsed());

        let Some(region) = region else {
            if json {
                writeln!(out, "{}", serde_json::json!({ "ip": ip, "location": null }))?;
            } else {
                writeln!(out, "{}\tnot found", ip)?;
            }
            continue;
        };

        if raw && !json {
            writeln!(out, "{}\t{}", ip, region)?;
            continue;
        }

        let location = match k2region::Location::from_region(&region) {
            Ok(location) => location,
            Err(e) => {
                eprintln!("{}: {}", ip, e);
                failed += 1;
                continue;
            }
        };

        if json {
            let location = if raw { location } else { location.normalized() };
            writeln!(out, "{}", serde_json::json!({ "ip": ip, "location": location }))?;
        } else {
            writeln!(out, "{}\t{}", ip, location.normalized())?;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} lookups failed", failed, ips.len()).into());
    }

    Ok(())
}

fn info(db: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let searcher = Searcher::open(db, CachePolicy::File)?;
    let header = *searcher.header();
    let verified = loader::verify_file(db);

    if json {
        let report = serde_json::json!({
            "path": db,
            "header": header,
            "segments": header.segment_count(),
            "valid": verified.is_ok(),
            "error": verified.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File:        {:?}", db);
        println!("Version:     {}", header.version);
        match header.policy() {
            Some(policy) => println!("Policy:      {:?}", policy),
            None => println!("Policy:      unknown ({})", header.index_policy),
        }
        println!("Created at:  {}", header.created_at);
        println!(
            "Segments:    {} ({}..={})",
            header.segment_count(),
            header.start_index_ptr,
            header.end_index_ptr
        );
        match &verified {
            Ok(_) => println!("Structure:   ok"),
            Err(e) => println!("Structure:   {}", e),
        }
    }

    verified?;
    Ok(())
}
