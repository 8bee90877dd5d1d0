use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use super::{connect, Command};
use crate::api::ParcelFilter;
use crate::config::GeoTnbConfig;
use crate::domain::{Parcel, ValidationState};
use crate::export::{write_csv, write_geojson, ExportFormat};

pub struct ExportCommand {
    pub config: GeoTnbConfig,
    pub input: Option<PathBuf>,
    pub format: ExportFormat,
    pub output: Option<PathBuf>,
    pub state: Option<ValidationState>,
}

impl ExportCommand {
    async fn load_parcels(&self) -> Result<Vec<Parcel>> {
        let parcels: Vec<Parcel> = match &self.input {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&content).with_context(|| format!("{} is not a parcel list", path.display()))?
            }
            None => {
                let client = connect(&self.config)?;
                let filter = ParcelFilter {
                    state: self.state,
                    ..ParcelFilter::default()
                };
                client.parcels.list_all(&filter).await?
            }
        };

        Ok(match self.state {
            Some(state) => parcels.into_iter().filter(|p| p.validation_state == state).collect(),
            None => parcels,
        })
    }

    fn write_to<W: Write>(&self, writer: W, parcels: &[Parcel]) -> Result<usize> {
        let count = match self.format {
            ExportFormat::Csv => write_csv(writer, parcels)?,
            ExportFormat::GeoJson => write_geojson(writer, parcels)?,
        };
        Ok(count)
    }
}

impl Command for ExportCommand {
    async fn execute(&self) -> Result<()> {
        let parcels = self.load_parcels().await?;

        match &self.output {
            Some(path) => {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                let count = self.write_to(std::io::BufWriter::new(file), &parcels)?;
                println!("✅ Exported {count} parcel(s) to {}", path.display());
            }
            None => {
                let stdout = std::io::stdout();
                self.write_to(stdout.lock(), &parcels)?;
            }
        }
        Ok(())
    }
}
