use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the Instance Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Provisioning domain the instance commands address
    #[arg(short, long, default_value = "web")]
    domain: String,

    /// Caller identity sent in the identity header
    #[arg(short, long)]
    principal: Option<String>,

    /// Identity header name configured on the gateway
    #[arg(long, default_value = "x-principal-id")]
    identity_header: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health
    Health,
    /// List instances in the domain
    Instances,
    /// Launch a new instance
    Launch {
        #[arg(long)]
        instance_type: Option<String>,

        #[arg(long)]
        application: Option<String>,
    },
    /// Start, stop, restart or terminate an instance
    Manage { instance_id: String, action: String },
    /// List deployed applications
    Applications,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(principal) = &cli.principal {
        headers.insert(
            reqwest::header::HeaderName::from_bytes(cli.identity_header.as_bytes())?,
            HeaderValue::from_str(principal)?,
        );
    }

    let instances = format!("{}/{}/instances", cli.url, cli.domain);

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)).headers(headers).send().await?,
        Commands::Instances => client.get(&instances).headers(headers).send().await?,
        Commands::Launch {
            instance_type,
            application,
        } => {
            let mut body = serde_json::Map::new();
            if let Some(instance_type) = instance_type {
                body.insert("instance_type".into(), json!(instance_type));
            }
            if let Some(application) = application {
                body.insert("application".into(), json!(application));
            }
            client
                .post(&instances)
                .headers(headers)
                .json(&Value::Object(body))
                .send()
                .await?
        }
        Commands::Manage {
            instance_id,
            action,
        } => {
            client
                .put(format!("{instances}/{instance_id}"))
                .headers(headers)
                .json(&json!({ "action": action }))
                .send()
                .await?
        }
        Commands::Applications => {
            client
                .get(format!("{}/{}/applications", cli.url, cli.domain))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
