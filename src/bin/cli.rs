//! PromoKV CLI Client
//!
//! Command-line interface for interacting with PromoKV.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use promokv::network::Client;

/// PromoKV CLI
#[derive(Parser, Debug)]
#[command(name = "promokv-cli")]
#[command(about = "CLI for the PromoKV promotion store")]
struct Args {
    /// Server address
    #[arg(short, long, env = "PROMOKV_SERVER", default_value = "127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a promotion by id
    Get {
        /// The promotion id
        id: String,
    },

    /// Replace the server's dataset with a CSV file
    Upload {
        /// Path to the CSV file (id,price,expiration; no header)
        file: PathBuf,
    },

    /// Show dataset stats
    Stats,

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> promokv::Result<ExitCode> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { id } => match client.lookup(&id)? {
            Some(view) => {
                println!("id:              {}", view.id);
                println!("price:           {}", view.price);
                println!("expiration_date: {}", view.expiration_date);
            }
            None => {
                println!("not found.");
                return Ok(ExitCode::from(2));
            }
        },
        Commands::Upload { file } => {
            let message = client.upload_path(&file)?;
            println!("{}", message);
        }
        Commands::Stats => {
            let stats = client.stats()?;
            println!("records:      {}", stats.records);
            println!("distinct ids: {}", stats.distinct_ids);
            println!("generation:   {}", stats.generation);
            println!("loaded at:    {}", stats.loaded_at);
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(ExitCode::SUCCESS)
}
