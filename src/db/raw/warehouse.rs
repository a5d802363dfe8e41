use futures::pin_mut;
use log::info;
use tokio_postgres::{binary_copy::BinaryCopyInWriter, types::ToSql, Client};

use crate::{
    config::DbConfig,
    error::LoadError,
    table::Table,
    utils::lib_postgres::{connect, pg_type, quote_ident},
};

/// Create the schema if it's not there yet.  Uses its own connection which
/// is closed before returning, on success or failure.
pub async fn ensure_schema(config: &DbConfig, schema: &str) -> Result<(), LoadError> {
    let (client, connection) = connect(config).await?;
    let res = client
        .batch_execute(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
        .await;
    drop(client);
    let _ = connection.await;
    res?;
    info!("RAW schema created successfully.");
    Ok(())
}

/// Handle for the bulk table writes.  Connects on the first write and keeps
/// the connection for the rest of the run.
pub struct Warehouse {
    pub config: DbConfig,
    client: Option<Client>,
}

impl Warehouse {
    pub fn new(config: DbConfig) -> Warehouse {
        Warehouse {
            config,
            client: None,
        }
    }

    async fn client(&mut self) -> Result<&mut Client, LoadError> {
        let client = match self.client.take() {
            Some(client) if !client.is_closed() => client,
            _ => {
                info!("connecting to {}", self.config);
                connect(&self.config).await?.0
            }
        };
        Ok(self.client.insert(client))
    }

    /// Drop `schema.name` and recreate it from `table`, all in one transaction.
    /// Return the number of rows written.
    pub async fn replace_table(
        &mut self,
        schema: &str,
        name: &str,
        table: &Table,
    ) -> Result<u64, LoadError> {
        if table.columns.is_empty() {
            return Err(LoadError::Table(format!("{}.{} has no columns", schema, name)));
        }
        let target = format!("{}.{}", quote_ident(schema), quote_ident(name));
        let column_defs = table
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.kind.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        let column_names = table
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let types: Vec<_> = table.columns.iter().map(|c| pg_type(c.kind)).collect();

        let client = self.client().await?;
        let tx = client.transaction().await?;
        tx.batch_execute(&format!(
            "DROP TABLE IF EXISTS {t};\nCREATE TABLE {t} ({cols});",
            t = target,
            cols = column_defs
        ))
        .await?;

        let copy = format!("COPY {} ({}) FROM STDIN BINARY", target, column_names);
        let writer = BinaryCopyInWriter::new(tx.copy_in(&copy).await?, &types);
        pin_mut!(writer);
        for row in &table.rows {
            let values: Vec<&(dyn ToSql + Sync)> =
                row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            writer.as_mut().write(&values).await?;
        }
        let n = writer.finish().await?;
        tx.commit().await?;
        Ok(n)
    }
}
