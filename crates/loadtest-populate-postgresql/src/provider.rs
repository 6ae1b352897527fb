//! PostgreSQL connections for batch workers.

use crate::error::PostgreSQLPopulatorError;
use crate::insert::insert_batch;
use async_trait::async_trait;
use bench_core::{Row, TableSchema};
use loadtest_populate::{BatchConnection, BatchError, ConnectionProvider};
use std::str::FromStr;
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, error};

/// Opens a new, independent PostgreSQL connection per call.
#[derive(Clone, Debug)]
pub struct PostgreSQLConnectionProvider {
    config: Config,
}

impl PostgreSQLConnectionProvider {
    /// Create a provider from connection parameters.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create a provider from a connection string, either key/value
    /// (`host=localhost user=postgres`) or URL (`postgresql://...`) form.
    pub fn from_connection_string(conn_str: &str) -> Result<Self, PostgreSQLPopulatorError> {
        let config = Config::from_str(conn_str)
            .map_err(|e| PostgreSQLPopulatorError::Config(e.to_string()))?;
        Ok(Self::new(config))
    }

    /// Connection parameters.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a connection and spawn its driver task.
    ///
    /// The driver task ends when the returned client is dropped.
    pub async fn connect(&self) -> Result<Client, PostgreSQLPopulatorError> {
        let (client, connection) = self.config.connect(NoTls).await?;

        // Spawn the connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {}", e);
            }
        });

        debug!("Opened PostgreSQL connection");
        Ok(client)
    }
}

#[async_trait]
impl ConnectionProvider for PostgreSQLConnectionProvider {
    type Connection = PostgreSQLConnection;

    async fn open(&self) -> Result<PostgreSQLConnection, BatchError> {
        let client = self
            .connect()
            .await
            .map_err(|e| BatchError::Connection(e.to_string()))?;
        Ok(PostgreSQLConnection { client })
    }
}

/// A connection owned by one batch; closed when dropped.
pub struct PostgreSQLConnection {
    client: Client,
}

#[async_trait]
impl BatchConnection for PostgreSQLConnection {
    async fn write_batch(
        &mut self,
        table_name: &str,
        schema: &TableSchema,
        rows: &[Row],
    ) -> Result<u64, BatchError> {
        let insert_error = |e: PostgreSQLPopulatorError| BatchError::Insert(e.to_string());

        let transaction = self
            .client
            .transaction()
            .await
            .map_err(|e| BatchError::Insert(e.to_string()))?;

        // Dropping the transaction on an error path rolls it back.
        let inserted = insert_batch(&transaction, table_name, schema, rows)
            .await
            .map_err(insert_error)?;

        transaction
            .commit()
            .await
            .map_err(|e| BatchError::Insert(format!("commit failed: {e}")))?;

        Ok(inserted)
    }
}
