use bento_worker::http::response::{X_CONTAINER_ID, X_PROCESSED_BY};
use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "worker-cli")]
#[command(about = "Probe a running Bento edge worker", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8787")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the worker's own health endpoint
    Health,
    /// Send a request through the worker and show the diagnostic headers
    Probe {
        /// Path to request, e.g. /ping
        #[arg(default_value = "/")]
        path: String,

        /// HTTP method to use
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_body(res).await?;
        }
        Commands::Probe { path, method } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let res = client
                .request(method, format!("{}{}", base, path))
                .send()
                .await?;

            println!("Status: {}", res.status());
            for name in [X_PROCESSED_BY, X_CONTAINER_ID] {
                let value = res
                    .headers()
                    .get(name.as_str())
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("<missing>");
                println!("{}: {}", name, value);
            }
            print_body(res).await?;
        }
    }

    Ok(())
}

async fn print_body(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        eprintln!("Error: worker returned status {}", status);
    }
    Ok(())
}
