use clap::{Parser, Subcommand};
use url::form_urlencoded;

#[derive(Parser)]
#[command(name = "gatehouse-cli")]
#[command(about = "Management CLI for the gatehouse proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8085")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy liveness
    Health,
    /// Register (or overwrite) a route
    Register {
        /// Route key: the first path segment to match
        #[arg(long)]
        id: String,
        /// Backend URL, e.g. http://localhost:9999
        #[arg(long)]
        target: String,
    },
    /// List registered routes
    Routes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
        Commands::Register { id, target } => {
            // The proxy unescapes `target` once more after query decoding
            let target: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
            client
                .get(format!("{}/register", cli.url))
                .query(&[("id", id.as_str()), ("target", target.as_str())])
                .send()
                .await?
        }
        Commands::Routes => client.get(format!("{}/routes", cli.url)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
    } else {
        print!("{}", text);
    }
    Ok(())
}
