use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Management CLI for the route compiler admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check system status
    Status,
    /// List every route node from both provenances
    List,
    /// Create a persisted route
    Create {
        #[arg(long)]
        uri: String,
        /// May be given multiple times
        #[arg(long = "method", required = true)]
        methods: Vec<String>,
        /// Action descriptor (Class@method, view:..., redirect:...)
        #[arg(long, conflicts_with = "entry_id")]
        action: Option<String>,
        /// Content entry id (switches the route to entry dispatch)
        #[arg(long)]
        entry_id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        /// Persisted group to create the route under
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Soft-delete a persisted node (cascades to descendants)
    Delete {
        id: i64,
    },
    /// Apply a reorder batch from a JSON file: [{"id":5,"parent_id":3,"sort_order":0}, ...]
    Reorder {
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::List => {
            let res = client
                .get(format!("{}/admin/routes", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Create {
            uri,
            methods,
            action,
            entry_id,
            name,
            parent,
        } => {
            let mut body = json!({
                "kind": "route",
                "uri": uri,
                "methods": methods,
            });
            if let Some(action) = action {
                body["action"] = json!(action);
            }
            if let Some(entry_id) = entry_id {
                body["action_type"] = json!("entry");
                body["entry_id"] = json!(entry_id);
            }
            if let Some(name) = name {
                body["name"] = json!(name);
            }
            if let Some(parent) = parent {
                body["parent_id"] = json!(parent);
            }
            let res = client
                .post(format!("{}/admin/routes", cli.url))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { id } => {
            let res = client
                .delete(format!("{}/admin/routes/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Reorder { file } => {
            let raw = std::fs::read_to_string(file)?;
            let changes: Value = serde_json::from_str(&raw)?;
            let res = client
                .post(format!("{}/admin/routes/reorder", cli.url))
                .headers(headers)
                .json(&changes)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
