//! Table administration: create, drop, clear, list, count and show.
//!
//! Every operation opens its own short-lived connection from the provider.

use crate::error::PostgreSQLPopulatorError;
use crate::insert::{
    generate_clear_table, generate_count_rows, generate_create_table, generate_drop_table,
    generate_show_rows, LIST_TABLES_SQL,
};
use crate::provider::PostgreSQLConnectionProvider;
use bench_core::TableSchema;
use tokio_postgres::SimpleQueryMessage;
use tracing::{debug, info};

/// Rows returned by [`TableAdmin::show_rows`], rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Cell text per row; `None` is SQL NULL.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RowSet {
    /// Render as an aligned text table.
    pub fn to_table_string(&self) -> String {
        let cell = |value: &Option<String>| value.clone().unwrap_or_else(|| "NULL".to_string());

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell(value).len());
                }
            }
        }

        let format_line = |cells: Vec<String>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, &w)| format!("{c:<w$}"))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = format_line(self.columns.clone());
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_line(row.iter().map(cell).collect()));
            out.push('\n');
        }
        out
    }
}

/// Administrative operations on benchmark tables.
pub struct TableAdmin {
    provider: PostgreSQLConnectionProvider,
}

impl TableAdmin {
    /// Create an admin over `provider`.
    pub fn new(provider: PostgreSQLConnectionProvider) -> Self {
        Self { provider }
    }

    /// Create the table if it does not exist.
    pub async fn create_table(
        &self,
        table_name: &str,
        schema: &TableSchema,
    ) -> Result<(), PostgreSQLPopulatorError> {
        let sql = generate_create_table(table_name, schema)?;
        let client = self.provider.connect().await?;
        info!("Creating table: {}", table_name);
        debug!("DDL: {}", sql);
        client.execute(sql.as_str(), &[]).await?;
        Ok(())
    }

    /// Drop the table if it exists.
    pub async fn drop_table(&self, table_name: &str) -> Result<(), PostgreSQLPopulatorError> {
        let sql = generate_drop_table(table_name)?;
        let client = self.provider.connect().await?;
        info!("Dropping table: {}", table_name);
        client.execute(sql.as_str(), &[]).await?;
        Ok(())
    }

    /// Delete every row, returning how many were removed.
    pub async fn clear_table(&self, table_name: &str) -> Result<u64, PostgreSQLPopulatorError> {
        let sql = generate_clear_table(table_name)?;
        let client = self.provider.connect().await?;
        info!("Clearing table: {}", table_name);
        Ok(client.execute(sql.as_str(), &[]).await?)
    }

    /// Names of the tables in the `public` schema, sorted.
    pub async fn list_tables(&self) -> Result<Vec<String>, PostgreSQLPopulatorError> {
        let client = self.provider.connect().await?;
        let rows = client.query(LIST_TABLES_SQL, &[]).await?;
        Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect())
    }

    /// Number of rows in the table.
    pub async fn count_rows(&self, table_name: &str) -> Result<u64, PostgreSQLPopulatorError> {
        let sql = generate_count_rows(table_name)?;
        let client = self.provider.connect().await?;
        let row = client.query_one(sql.as_str(), &[]).await?;
        let count: i64 = row.get(0);
        Ok(count as u64)
    }

    /// The first `limit` rows, as text.
    pub async fn show_rows(
        &self,
        table_name: &str,
        limit: u64,
    ) -> Result<RowSet, PostgreSQLPopulatorError> {
        let sql = generate_show_rows(table_name, limit)?;
        let client = self.provider.connect().await?;

        let statement = client.prepare(&sql).await?;
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let rows = client
            .simple_query(&sql)
            .await?
            .into_iter()
            .filter_map(|message| match message {
                SimpleQueryMessage::Row(row) => Some(
                    (0..row.len())
                        .map(|i| row.get(i).map(str::to_string))
                        .collect(),
                ),
                _ => None,
            })
            .collect();

        Ok(RowSet { columns, rows })
    }
}
