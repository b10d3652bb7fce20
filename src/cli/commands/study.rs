use clap::Subcommand;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::cli::client::StudyClient;
use crate::cli::config::load_environment_config;
use crate::cli::utils::{output_error, output_success, output_value, read_stdin_json};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum StudyCommands {
    #[command(about = "List your studies")]
    List,

    #[command(about = "Show one study, or its clusters")]
    Show {
        #[arg(help = "Study ID")]
        id: String,
        #[arg(long, help = "Show the clusters of the study instead of its detail")]
        clusters: bool,
    },

    #[command(about = "Create a study from a JSON object on stdin")]
    Create,

    #[command(about = "Update title, description or isLive from a JSON object on stdin")]
    Update {
        #[arg(help = "Study ID")]
        id: String,
    },

    #[command(about = "Delete a study")]
    Delete {
        #[arg(help = "Study ID")]
        id: String,
    },
}

pub async fn handle(cmd: StudyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_environment_config()?;
    let client = StudyClient::from_config(&config);

    match cmd {
        StudyCommands::List => {
            let body = client.list().await?;
            output_value(&output_format, &body, print_study_table)
        }
        StudyCommands::Show { id, clusters } => {
            let body = client.show(&id, clusters).await?;
            output_value(&output_format, &body, |value| {
                if clusters {
                    print_clusters(value);
                } else {
                    print_study(value);
                }
            })
        }
        StudyCommands::Create => {
            let payload = read_stdin_json()?;
            let outcome = client.create(&payload).await?;
            let body = outcome.body.unwrap_or(Value::Null);

            if let Some(error) = body.get("error").filter(|e| e.is_string()) {
                let message = error.as_str().unwrap_or_default();
                output_error(&output_format, message, Some("CREATE_REJECTED"))?;
                anyhow::bail!("study was not created");
            }
            if !outcome.status.is_success() {
                anyhow::bail!("server returned {}: {}", outcome.status, body);
            }

            let id = body["study"]["id"].as_str().unwrap_or_default().to_string();
            output_success(&output_format, &format!("Created study {}", id), Some(body))
        }
        StudyCommands::Update { id } => {
            let payload = read_stdin_json()?;
            let outcome = client.update(&id, &payload).await?;
            match outcome.status {
                StatusCode::OK => output_success(
                    &output_format,
                    &format!("Updated study {}", id),
                    Some(json!({ "id": id })),
                ),
                StatusCode::BAD_REQUEST => anyhow::bail!("nothing to update: provide title, description or isLive"),
                status => anyhow::bail!("update of study {} failed ({})", id, status),
            }
        }
        StudyCommands::Delete { id } => {
            let outcome = client.delete(&id).await?;
            if outcome.status == StatusCode::NO_CONTENT {
                output_success(&output_format, &format!("Deleted study {}", id), Some(json!({ "id": id })))
            } else {
                anyhow::bail!("delete of study {} failed ({})", id, outcome.status)
            }
        }
    }
}

fn print_study_table(body: &Value) {
    let studies = body["studies"].as_array().cloned().unwrap_or_default();
    if studies.is_empty() {
        println!("No studies found");
        return;
    }

    println!("{:<38} {:<6} {:>9} {:>9}  {}", "ID", "LIVE", "COMPLETED", "ABANDONED", "TITLE");
    for study in studies {
        println!(
            "{:<38} {:<6} {:>9} {:>9}  {}",
            study["id"].as_str().unwrap_or_default(),
            if study["isLive"].as_bool().unwrap_or(false) { "yes" } else { "no" },
            study["completedNo"].as_i64().unwrap_or(0),
            study["abandonedNo"].as_i64().unwrap_or(0),
            study["title"].as_str().unwrap_or_default(),
        );
    }
}

fn print_study(body: &Value) {
    let study = &body["study"];
    println!("{}", study["title"].as_str().unwrap_or_default());
    println!("  id:          {}", study["id"].as_str().unwrap_or_default());
    println!("  description: {}", study["description"].as_str().unwrap_or_default());
    println!("  sort type:   {}", study["sortType"].as_str().unwrap_or_default());
    println!("  live:        {}", study["isLive"].as_bool().unwrap_or(false));
    println!("  cards:       {}", study["cards"].as_array().map_or(0, Vec::len));
    println!("  launched:    {}", study["launchedDate"].as_str().unwrap_or_default());
    if let Some(end) = study["endDate"].as_str() {
        println!("  ended:       {}", end);
    }
}

fn print_clusters(body: &Value) {
    let clusters = body["clusters"].as_array().cloned().unwrap_or_default();
    if clusters.is_empty() {
        println!("No clusters yet");
        return;
    }
    for cluster in clusters {
        println!(
            "{} ({} cards)",
            cluster["name"].as_str().unwrap_or_default(),
            cluster["cards"].as_array().map_or(0, Vec::len)
        );
    }
}
