use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::client::StudyClient;
use crate::cli::config::{load_environment_config, save_environment_config};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Store a bearer token issued by the login service")]
    Login {
        #[arg(long, help = "Bearer token")]
        token: String,
    },

    #[command(about = "Forget the stored token")]
    Logout,

    #[command(about = "Sign a development token with JWT_SECRET")]
    Mint {
        #[arg(long, help = "User id (UUID) to place in the token")]
        user: Uuid,
        #[arg(long, help = "Validity in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
        #[arg(long, help = "Also store the minted token as the current login")]
        save: bool,
    },

    #[command(about = "Show the username the server resolves for the stored token")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { token } => {
            let mut config = load_environment_config()?;
            config.token = Some(token.trim().to_string());
            config.touch();
            save_environment_config(&config)?;
            output_success(&output_format, "Token stored", None)
        }
        AuthCommands::Logout => {
            let mut config = load_environment_config()?;
            config.token = None;
            config.touch();
            save_environment_config(&config)?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Mint { user, hours, save } => {
            let settings = &crate::config::config().security;
            let hours = hours.unwrap_or(settings.jwt_expiry_hours);
            let token = generate_jwt(&Claims::new(user, hours), &settings.jwt_secret)?;

            if save {
                let mut config = load_environment_config()?;
                config.token = Some(token.clone());
                config.touch();
                save_environment_config(&config)?;
            }

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token minted",
                    Some(json!({ "token": token, "user_id": user, "expires_in_hours": hours })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        AuthCommands::Whoami => {
            let config = load_environment_config()?;
            let body = StudyClient::from_config(&config).username().await?;
            let username = body.get("username").and_then(|v| v.as_str()).unwrap_or("<unknown>");
            output_success(
                &output_format,
                &format!("Signed in as {}", username),
                Some(json!({ "username": username })),
            )
        }
    }
}
