use clap::{Parser, Subcommand};
use reqwest::StatusCode;

use iwara_proxy::credentials::status::{decode_claims, token_status};

#[derive(Parser)]
#[command(name = "iwara-proxy-cli")]
#[command(about = "Operator CLI for the Iwara reverse proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Basic-Auth user, when the proxy's access gate is enabled.
    #[arg(long, env = "BASIC_AUTH_USER")]
    user: Option<String>,

    /// Basic-Auth password.
    #[arg(long, env = "BASIC_AUTH_PASS")]
    pass: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a running proxy whether its backend token is still valid
    Status,
    /// Decode a token locally and print its claims and status
    Inspect {
        /// Raw or Bearer-prefixed token
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let client = reqwest::Client::new();
            let mut request = client.get(format!("{}/token-status", cli.url.trim_end_matches('/')));
            if cli.user.is_some() || cli.pass.is_some() {
                request = request.basic_auth(cli.user.unwrap_or_default(), cli.pass);
            }
            let res = request.send().await?;
            print_status(res).await?;
        }
        Commands::Inspect { token } => {
            println!("status: {}", token_status(&token).as_str());
            match decode_claims(&token) {
                Some(claims) => println!("{}", serde_json::to_string_pretty(&claims)?),
                None => eprintln!("Token payload could not be decoded"),
            }
        }
    }

    Ok(())
}

async fn print_status(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let retry_after = res
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match status {
        StatusCode::NO_CONTENT if retry_after.is_some() => {
            println!("not_configured (retry after {}s)", retry_after.unwrap_or_default());
        }
        StatusCode::NO_CONTENT => println!("valid"),
        StatusCode::OK => {
            let json: serde_json::Value = res.json().await?;
            println!("expired");
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            eprintln!("Error: proxy returned status {}", status);
            if let Ok(text) = res.text().await {
                eprintln!("Response: {}", text);
            }
        }
    }
    Ok(())
}
