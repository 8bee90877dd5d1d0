use anyhow::Result;

use super::{connect, Command};
use crate::config::GeoTnbConfig;

pub struct LoginCommand {
    pub config: GeoTnbConfig,
    pub username: String,
    pub password: String,
}

impl Command for LoginCommand {
    async fn execute(&self) -> Result<()> {
        let client = connect(&self.config)?;
        let response = client.auth.login(&self.username, &self.password).await?;
        match response.user {
            Some(user) => println!("✅ Logged in as {} ({})", user.username, user.role.label()),
            None => println!("✅ Logged in as {}", self.username),
        }
        Ok(())
    }
}

pub struct LogoutCommand {
    pub config: GeoTnbConfig,
}

impl Command for LogoutCommand {
    async fn execute(&self) -> Result<()> {
        let client = connect(&self.config)?;
        if !client.auth.is_authenticated() {
            println!("No active session");
            return Ok(());
        }
        client.auth.logout().await?;
        println!("👋 Logged out");
        Ok(())
    }
}
