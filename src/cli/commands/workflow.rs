use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use super::Command;
use crate::domain::{Parcel, Role, ValidationState};
use crate::workflow::{can_transition, check_transition, validate, TRANSITIONS};

pub struct TransitionsCommand;

impl Command for TransitionsCommand {
    async fn execute(&self) -> Result<()> {
        println!("🔀 VALIDATION WORKFLOW");
        for rule in &TRANSITIONS {
            let roles: Vec<&str> = rule.allowed_roles.iter().map(|r| r.wire_name()).collect();
            let checks: Vec<&str> = rule.validations.iter().map(|v| v.name()).collect();
            println!("{} -> {}", rule.from.wire_name(), rule.to.wire_name());
            println!("   roles: {}", roles.join(", "));
            if !checks.is_empty() {
                println!("   rules: {}", checks.join(", "));
            }
        }
        Ok(())
    }
}

pub struct CanTransitionCommand {
    pub from: ValidationState,
    pub to: ValidationState,
    pub role: Role,
}

impl Command for CanTransitionCommand {
    async fn execute(&self) -> Result<()> {
        let verdict = if can_transition(self.from, self.to, self.role) {
            "allowed"
        } else {
            "denied"
        };
        println!("{} -> {} for {}: {}", self.from, self.to, self.role.wire_name(), verdict);
        Ok(())
    }
}

pub struct ValidateCommand {
    pub file: PathBuf,
    pub to: ValidationState,
    pub role: Option<Role>,
}

impl Command for ValidateCommand {
    async fn execute(&self) -> Result<()> {
        let content = std::fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let parcel: Parcel = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a parcel document", self.file.display()))?;

        let report = match self.role {
            Some(role) => check_transition(&parcel, self.to, role),
            None => validate(&parcel, self.to),
        };

        if report.valid {
            println!("✅ {}: {} -> {} is valid", parcel.reference, parcel.validation_state, self.to);
            return Ok(());
        }

        println!("❌ {}: {} -> {} is refused", parcel.reference, parcel.validation_state, self.to);
        for error in &report.errors {
            println!("   - {error}");
        }
        bail!("{} validation error(s)", report.errors.len())
    }
}
