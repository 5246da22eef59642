//! `edgectl services` — list services on the account.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use edgectl_api::Service;

use crate::ApiOpts;

/// Arguments for `edgectl services`.
#[derive(Args, Debug)]
pub struct ServicesArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "active version")]
    active_version: i64,
    #[tabled(rename = "updated")]
    updated: String,
}

impl From<&Service> for ServiceRow {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            id: service.id.clone(),
            active_version: service.active_version,
            updated: service
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

impl ServicesArgs {
    pub fn run(self, api: &ApiOpts) -> Result<()> {
        let client = api.client()?;
        let mut services = client.list_services().context("listing services")?;
        services.sort_by(|a, b| a.name.cmp(&b.name));

        if self.json {
            println!("{}", serde_json::to_string_pretty(&services)?);
            return Ok(());
        }

        if services.is_empty() {
            println!("No services found.");
            return Ok(());
        }

        let rows: Vec<ServiceRow> = services.iter().map(ServiceRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{table}");
        Ok(())
    }
}
