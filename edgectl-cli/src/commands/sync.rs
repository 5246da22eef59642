//! `edgectl sync` — converge a remote edge dictionary to a local CSV file.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use edgectl_sync::{CsvSource, DictionaryTarget, Reconciler, SyncOutcome};

use crate::ApiOpts;

/// Arguments for `edgectl sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the two-column CSV file holding the desired items.
    #[arg(long)]
    pub path: PathBuf,

    /// Name of the service owning the dictionary.
    #[arg(long)]
    pub service: String,

    /// Name of the dictionary to update.
    #[arg(long)]
    pub dict: String,
}

impl SyncArgs {
    pub fn run(self, api: &ApiOpts) -> Result<()> {
        let client = api.client()?;

        let file = File::open(&self.path)
            .with_context(|| format!("cannot open {}", self.path.display()))?;
        let source = CsvSource::new(BufReader::new(file));

        let service = client
            .service_by_name(&self.service)
            .context("searching for service")?;
        let Some(service) = service else {
            bail!("cannot find service '{}'", self.service);
        };

        let dictionary = client
            .dictionary_by_name(&service.id, service.active_version, &self.dict)
            .with_context(|| {
                format!("resolving dictionary '{}' on '{}'", self.dict, self.service)
            })?;

        let target = DictionaryTarget {
            service_id: service.id,
            dictionary_id: dictionary.id,
        };
        let outcome = Reconciler::new(&client, source, target)
            .sync()
            .with_context(|| format!("sync failed for '{}'", self.dict))?;

        print_outcome(&self.dict, &outcome);
        Ok(())
    }
}

fn print_outcome(dict: &str, outcome: &SyncOutcome) {
    if outcome.is_noop() {
        println!("{} '{dict}' — already in sync", "✓".green());
        return;
    }

    println!(
        "{} '{dict}' synced ({} created, {} updated, {} deleted in {} {})",
        "✓".green(),
        outcome.created,
        outcome.updated,
        outcome.deleted,
        outcome.batches,
        if outcome.batches == 1 { "batch" } else { "batches" },
    );
}
