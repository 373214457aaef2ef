use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use resonance_membrane::config::schema::{DEFAULT_PROJECT_ID, DEFAULT_SHARED_SECRET};
use resonance_membrane::http::{X_RESONANCE_SIGNATURE, X_RESONANCE_TIMESTAMP};
use resonance_membrane::security::expected_signature;

#[derive(Parser)]
#[command(name = "membrane-cli")]
#[command(about = "Operator CLI for the Resonance Membrane", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "KINETIC_SECRET", default_value = DEFAULT_SHARED_SECRET, hide_env_values = true)]
    secret: String,

    #[arg(short, long, env = "GCP_PROJECT_ID", default_value = DEFAULT_PROJECT_ID)]
    project_id: String,

    #[command(subcommand)]
    command: Commands,
}

/// Non-2xx answer from the membrane; makes the process exit non-zero.
#[derive(Debug, Error)]
#[error("membrane returned status {status}: {body}")]
struct Rejected {
    status: StatusCode,
    body: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the unauthenticated health endpoint
    Health,
    /// Print the resonance headers for a timestamp
    Sign {
        /// Epoch seconds to sign (defaults to now)
        #[arg(short, long)]
        timestamp: Option<String>,
    },
    /// Send a signed POST and print the response
    Post {
        /// Path on the backend, e.g. /api/generate
        path: String,
        /// JSON body
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
    /// Single-turn chat through /api/chat
    Chat {
        prompt: String,
        #[arg(short, long, default_value = "dolphin-r1:24b")]
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match &cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Sign { timestamp } => {
            let timestamp = timestamp.clone().unwrap_or_else(now_timestamp);
            let signature = expected_signature(&timestamp, &cli.project_id, &cli.secret);
            println!("{}: {}", X_RESONANCE_TIMESTAMP, timestamp);
            println!("{}: {}", X_RESONANCE_SIGNATURE, signature);
        }
        Commands::Post { path, data } => {
            let res = signed_post(&client, &cli, base, path, data.clone()).await?;
            print_response(res).await?;
        }
        Commands::Chat { prompt, model } => {
            let body = json!({
                "model": model,
                "messages": [{ "role": "user", "content": prompt }],
                "stream": false,
            });
            let res = signed_post(&client, &cli, base, "/api/chat", body.to_string()).await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn now_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:.3}", now.as_secs_f64())
}

async fn signed_post(
    client: &reqwest::Client,
    cli: &Cli,
    base: &str,
    path: &str,
    body: String,
) -> Result<reqwest::Response, reqwest::Error> {
    let timestamp = now_timestamp();
    let signature = expected_signature(&timestamp, &cli.project_id, &cli.secret);
    client
        .post(format!("{}{}", base, path))
        .header(CONTENT_TYPE, "application/json")
        .header(X_RESONANCE_SIGNATURE, signature)
        .header(X_RESONANCE_TIMESTAMP, timestamp)
        .body(body)
        .send()
        .await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    println!("{}", render(status, text)?);
    Ok(())
}

/// Pretty-print JSON bodies of successful responses.
fn render(status: StatusCode, text: String) -> Result<String, Rejected> {
    if !status.is_success() {
        return Err(Rejected { status, body: text });
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => Ok(serde_json::to_string_pretty(&json).unwrap_or(text)),
        Err(_) => Ok(text),
    }
}
