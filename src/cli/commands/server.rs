use clap::Subcommand;
use serde_json::json;

use crate::cli::client::StudyClient;
use crate::cli::config::{load_environment_config, save_environment_config};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at a study API server")]
    Use {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the currently selected server")]
    Current,

    #[command(about = "Check server health from the /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Use { url } => {
            url::Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid server URL '{}': {}", url, e))?;

            let mut config = load_environment_config()?;
            config.server_url = url.trim_end_matches('/').to_string();
            config.touch();
            save_environment_config(&config)?;

            output_success(
                &output_format,
                &format!("Using server {}", config.server_url),
                Some(json!({ "server_url": config.server_url })),
            )
        }
        ServerCommands::Current => {
            let config = load_environment_config()?;
            output_success(
                &output_format,
                &format!("Current server: {}", config.server_url),
                Some(json!({ "server_url": config.server_url })),
            )
        }
        ServerCommands::Health => {
            let config = load_environment_config()?;
            let outcome = StudyClient::from_config(&config).health().await?;
            let body = outcome.body.unwrap_or_default();

            if outcome.status.is_success() {
                output_success(&output_format, &format!("{} is up", config.server_url), Some(body))
            } else {
                output_error(
                    &output_format,
                    &format!("{} is degraded ({})", config.server_url, outcome.status),
                    Some("SERVER_DEGRADED"),
                )
            }
        }
    }
}
