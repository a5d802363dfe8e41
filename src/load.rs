use async_trait::async_trait;
use log::{error, info};

use crate::{
    db::raw::{
        dataset::{Dataset, RAW_SCHEMA},
        download::fetch_table,
        warehouse::{ensure_schema, Warehouse},
    },
    error::{error_chain, DownloadError, LoadError, RunError},
    table::Table,
};

/// Where the CSV files come from.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Table, DownloadError>;
}

#[async_trait]
impl Fetch for reqwest::Client {
    async fn fetch(&self, url: &str) -> Result<Table, DownloadError> {
        fetch_table(self, url).await
    }
}

/// Where the tables end up.
#[async_trait]
pub trait Store: Send {
    async fn ensure_schema(&mut self, schema: &str) -> Result<(), LoadError>;
    async fn replace_table(
        &mut self,
        schema: &str,
        name: &str,
        table: &Table,
    ) -> Result<u64, LoadError>;
}

#[async_trait]
impl Store for Warehouse {
    async fn ensure_schema(&mut self, schema: &str) -> Result<(), LoadError> {
        ensure_schema(&self.config, schema).await
    }

    async fn replace_table(
        &mut self,
        schema: &str,
        name: &str,
        table: &Table,
    ) -> Result<u64, LoadError> {
        Warehouse::replace_table(self, schema, name, table).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetOutcome {
    Loaded { rows: u64 },
    DownloadFailed(String),
    LoadFailed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<(String, DatasetOutcome)>,
}

impl RunReport {
    pub fn loaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DatasetOutcome::Loaded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.loaded()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Create the `raw` schema, then download each dataset and replace its table.
///
/// A schema failure stops the run before anything is downloaded.  A failed
/// dataset is logged and the next one is attempted.
pub async fn run<F, S>(
    fetch: &F,
    store: &mut S,
    datasets: &[Dataset],
) -> Result<RunReport, RunError>
where
    F: Fetch + ?Sized,
    S: Store + ?Sized,
{
    if let Err(e) = store.ensure_schema(RAW_SCHEMA).await {
        let e = RunError::Schema(e);
        error!("{}", error_chain(&e));
        return Err(e);
    }

    let mut report = RunReport::default();
    for dataset in datasets {
        let outcome = load_dataset(fetch, store, dataset).await;
        report.outcomes.push((dataset.table.clone(), outcome));
    }
    Ok(report)
}

async fn load_dataset<F, S>(fetch: &F, store: &mut S, dataset: &Dataset) -> DatasetOutcome
where
    F: Fetch + ?Sized,
    S: Store + ?Sized,
{
    let table = match fetch.fetch(&dataset.url).await {
        Ok(table) => table,
        Err(e) => {
            let reason = error_chain(&e);
            error!("Error downloading {}: {}", dataset.url, reason);
            return DatasetOutcome::DownloadFailed(reason);
        }
    };
    match store.replace_table(RAW_SCHEMA, &dataset.table, &table).await {
        Ok(rows) => {
            info!("Loaded {} into RAW schema successfully.", dataset.table);
            info!("Rows in {}: {}", dataset.table, rows);
            DatasetOutcome::Loaded { rows }
        }
        Err(e) => {
            let reason = error_chain(&e);
            error!("Error loading {}: {}", dataset.table, reason);
            DatasetOutcome::LoadFailed(reason)
        }
    }
}
