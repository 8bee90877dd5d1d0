use anyhow::Result;

use super::Command;
use crate::domain::{permissions, Role};

pub struct PermissionsCommand {
    pub role: Option<String>,
}

impl Command for PermissionsCommand {
    async fn execute(&self) -> Result<()> {
        let roles: Vec<Role> = match &self.role {
            Some(name) => vec![name.parse()?],
            None => Role::ALL.to_vec(),
        };

        for role in roles {
            let granted = permissions(role);
            println!("{} ({}) - {} permissions", role.wire_name(), role.label(), granted.len());
            for permission in granted {
                println!("  {}", permission.key());
            }
        }
        Ok(())
    }
}
