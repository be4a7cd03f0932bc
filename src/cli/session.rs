//! Login shared by every command

use anyhow::{Context, Result};
use dify_bulk::api::{DifyClient, Executor};
use dify_bulk::config::Config;
use is_terminal::IsTerminal;
use log::info;

/// An authenticated client for one run
pub struct Session {
    pub client: DifyClient,
    pub token: String,
}

impl Session {
    pub async fn open(config: &Config) -> Result<Self> {
        let email = config.email()?;
        let password = resolve_password(config, email)?;

        let executor = Executor::new(&config.resilience()).context("Failed to build HTTP client")?;
        let client = DifyClient::new(&config.dify.origin, executor);
        info!("Logging in to {} as {}", client.base_url(), email);

        let token = client
            .login(email, &password)
            .await
            .with_context(|| format!("Login to {} failed", config.dify.origin))?;
        Ok(Self { client, token })
    }
}

fn resolve_password(config: &Config, email: &str) -> Result<String> {
    match config.dify.password.as_deref() {
        Some(password) if !password.is_empty() => Ok(password.to_string()),
        _ if std::io::stdin().is_terminal() => {
            rpassword::prompt_password(format!("Password for {}: ", email)).context("Failed to read password")
        }
        _ => anyhow::bail!("No password configured (set PASSWORD or [dify] password)"),
    }
}
