use clap::{Parser, Subcommand};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspection CLI for the pomf download router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every server and show its load
    Servers,
    /// Show where a retrieval request would be redirected
    Resolve {
        #[arg(long, default_value = "0")]
        hash: String,
        #[arg(long, default_value = "bin")]
        ext: String,
        #[arg(long, default_value = "file.bin")]
        filename: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder().redirect(Policy::none()).build()?;
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Servers => {
            let res = client.get(format!("{}/servers", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Resolve { hash, ext, filename } => {
            let res = client
                .get(format!("{}/f2/", base))
                .query(&[("h", hash), ("e", ext), ("f", filename)])
                .send()
                .await?;

            match res.headers().get(LOCATION) {
                Some(location) if res.status().is_redirection() => {
                    println!("{}", location.to_str()?);
                }
                _ => {
                    eprintln!("Error: router returned status {} without a redirect", res.status());
                }
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: router returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
