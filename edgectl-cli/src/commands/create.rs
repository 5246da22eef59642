//! `edgectl create` — create a new service.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::ApiOpts;

/// Arguments for `edgectl create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name for the new service.
    #[arg(long)]
    pub service_name: String,
}

impl CreateArgs {
    pub fn run(self, api: &ApiOpts) -> Result<()> {
        let client = api.client()?;
        let service = client
            .create_service(&self.service_name)
            .context("creating service")?;

        println!("{} service '{}' created", "✓".green(), service.name);
        println!("  id: {}", service.id);
        Ok(())
    }
}
