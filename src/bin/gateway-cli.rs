use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the nanocode gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status and uptime
    Status,
    /// Show the effective configuration
    Config,
    /// Show rate limiter threshold and tracked clients
    RateLimits,
    /// Dump Prometheus metrics
    Metrics,
    /// Check liveness, or readiness with --ready
    Health {
        #[arg(long)]
        ready: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let path = match cli.command {
        Commands::Status => "/admin/status",
        Commands::Config => "/admin/config",
        Commands::RateLimits => "/admin/rate-limits",
        Commands::Metrics => {
            let res = client.get(format!("{}/admin/metrics", base)).send().await?;
            let status = res.status();
            let text = res.text().await?;
            if !status.is_success() {
                eprintln!("Error: Admin API returned status {}", status);
                eprintln!("Response: {}", text);
                return Ok(());
            }
            print!("{}", text);
            return Ok(());
        }
        Commands::Health { ready: false } => "/health",
        Commands::Health { ready: true } => "/health/ready",
    };

    let res = client.get(format!("{}{}", base, path)).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
