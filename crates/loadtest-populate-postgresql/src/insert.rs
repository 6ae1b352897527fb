//! Batched INSERT and DDL statements for PostgreSQL.

use crate::error::PostgreSQLPopulatorError;
use crate::params::{to_param, Param};
use bench_core::{validate_identifier, Row, TableSchema, PRIMARY_KEY_COLUMN};
use tokio_postgres::types::ToSql;
use tokio_postgres::GenericClient;
use tracing::debug;

/// Maximum number of bind parameters in one statement (the protocol sends
/// the count as a 16-bit integer).
pub const MAX_BIND_PARAMETERS: usize = 65535;

/// Query listing the tables of the `public` schema.
pub const LIST_TABLES_SQL: &str = "SELECT table_name::text FROM information_schema.tables \
     WHERE table_schema = 'public' ORDER BY table_name";

/// Validate `name` and wrap it in double quotes.
pub fn quote_identifier(name: &str) -> Result<String, PostgreSQLPopulatorError> {
    validate_identifier(name).map_err(PostgreSQLPopulatorError::InvalidIdentifier)?;
    Ok(format!("\"{name}\""))
}

/// How many rows fit in one statement for a table with `column_count` columns.
pub fn rows_per_statement(column_count: usize) -> usize {
    (MAX_BIND_PARAMETERS / column_count.max(1)).max(1)
}

/// Build a multi-row INSERT for `row_count` rows with `$n` placeholders.
pub fn build_insert_sql(
    table_name: &str,
    columns: &[&str],
    row_count: usize,
) -> Result<String, PostgreSQLPopulatorError> {
    let table = quote_identifier(table_name)?;
    let column_list = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Result<Vec<_>, _>>()?
        .join(", ");

    let col_count = columns.len();
    let mut placeholders: Vec<String> = Vec::with_capacity(row_count);
    let mut param_idx = 1;

    for _ in 0..row_count {
        let row_placeholders: Vec<String> = (0..col_count)
            .map(|_| {
                let p = format!("${param_idx}");
                param_idx += 1;
                p
            })
            .collect();
        placeholders.push(format!("({})", row_placeholders.join(", ")));
    }

    Ok(format!(
        "INSERT INTO {table} ({column_list}) VALUES {}",
        placeholders.join(", ")
    ))
}

/// Convert rows into bind parameters, in row-major order.
pub fn build_params(
    schema: &TableSchema,
    rows: &[Row],
) -> Result<Vec<Param>, PostgreSQLPopulatorError> {
    let mut params: Vec<Param> = Vec::with_capacity(rows.len() * schema.len());
    for row in rows {
        if row.len() != schema.len() {
            return Err(PostgreSQLPopulatorError::RowShape {
                expected: schema.len(),
                actual: row.len(),
            });
        }
        for (column, value) in schema.columns().iter().zip(row) {
            params.push(to_param(&column.name, &column.storage_type, value)?);
        }
    }
    Ok(params)
}

/// Insert a batch of rows.
///
/// Rows are sent as multi-row INSERT statements, split only when a single
/// statement would exceed [`MAX_BIND_PARAMETERS`]. Pass a transaction to
/// make the whole batch atomic.
pub async fn insert_batch<C: GenericClient + Sync>(
    client: &C,
    table_name: &str,
    schema: &TableSchema,
    rows: &[Row],
) -> Result<u64, PostgreSQLPopulatorError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let columns = schema.column_names();
    let chunk_rows = rows_per_statement(columns.len());
    let mut inserted = 0u64;

    for chunk in rows.chunks(chunk_rows) {
        let sql = build_insert_sql(table_name, &columns, chunk.len())?;
        let params = build_params(schema, chunk)?;

        // Convert to references for execution
        let param_refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        inserted += client.execute(sql.as_str(), &param_refs).await?;
    }

    debug!("Inserted {} rows into '{}'", inserted, table_name);
    Ok(inserted)
}

/// Generate CREATE TABLE statement from schema.
///
/// The table gets an auto-numbered `id` primary key followed by the schema
/// columns, with their type tokens as written in the schema file.
pub fn generate_create_table(
    table_name: &str,
    schema: &TableSchema,
) -> Result<String, PostgreSQLPopulatorError> {
    let mut definitions = vec![format!(
        "{} SERIAL PRIMARY KEY",
        quote_identifier(PRIMARY_KEY_COLUMN)?
    )];
    for column in schema.columns() {
        definitions.push(format!(
            "{} {}",
            quote_identifier(&column.name)?,
            column.storage_type.token()
        ));
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(table_name)?,
        definitions.join(", ")
    ))
}

/// Generate DROP TABLE statement.
pub fn generate_drop_table(table_name: &str) -> Result<String, PostgreSQLPopulatorError> {
    Ok(format!("DROP TABLE IF EXISTS {}", quote_identifier(table_name)?))
}

/// Generate a statement deleting every row.
pub fn generate_clear_table(table_name: &str) -> Result<String, PostgreSQLPopulatorError> {
    Ok(format!("DELETE FROM {}", quote_identifier(table_name)?))
}

/// Generate a row count query.
pub fn generate_count_rows(table_name: &str) -> Result<String, PostgreSQLPopulatorError> {
    Ok(format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name)?))
}

/// Generate a query returning the first `limit` rows.
pub fn generate_show_rows(table_name: &str, limit: u64) -> Result<String, PostgreSQLPopulatorError> {
    Ok(format!(
        "SELECT * FROM {} LIMIT {limit}",
        quote_identifier(table_name)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_core::ScalarValue;

    fn test_schema() -> TableSchema {
        let json = r#"{
            "name": { "type": "VARCHAR(50)", "values": ["Ana", "Bruno"] },
            "age": { "type": "INTEGER", "values": [20, 30] },
            "price": { "type": "NUMERIC(10,2)", "values": ["9.99"] }
        }"#;
        TableSchema::from_json(json).unwrap()
    }

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table("simulated_data", &test_schema()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"simulated_data\" (\"id\" SERIAL PRIMARY KEY, \
             \"name\" VARCHAR(50), \"age\" INTEGER, \"price\" NUMERIC(10,2))"
        );
    }

    #[test]
    fn test_generate_admin_statements() {
        assert_eq!(
            generate_drop_table("users").unwrap(),
            "DROP TABLE IF EXISTS \"users\""
        );
        assert_eq!(generate_clear_table("users").unwrap(), "DELETE FROM \"users\"");
        assert_eq!(
            generate_count_rows("users").unwrap(),
            "SELECT COUNT(*) FROM \"users\""
        );
        assert_eq!(
            generate_show_rows("users", 10).unwrap(),
            "SELECT * FROM \"users\" LIMIT 10"
        );
    }

    #[test]
    fn test_rejects_unsafe_identifiers() {
        assert!(generate_drop_table("users; DROP TABLE x").is_err());
        assert!(generate_clear_table("").is_err());
        assert!(build_insert_sql("t", &["bad\"col"], 1).is_err());
    }

    #[test]
    fn test_build_insert_sql_placeholders() {
        let sql = build_insert_sql("t", &["a", "b"], 3).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"t\" (\"a\", \"b\") VALUES ($1, $2), ($3, $4), ($5, $6)"
        );
    }

    #[test]
    fn test_rows_per_statement_respects_limit() {
        assert_eq!(rows_per_statement(3), 21845);
        assert_eq!(rows_per_statement(1), MAX_BIND_PARAMETERS);
        assert_eq!(rows_per_statement(0), MAX_BIND_PARAMETERS);
        assert!(rows_per_statement(7) * 7 <= MAX_BIND_PARAMETERS);
    }

    #[test]
    fn test_build_params_row_major() {
        let schema = test_schema();
        let rows = vec![
            vec![
                ScalarValue::Text("Ana".into()),
                ScalarValue::Int(20),
                ScalarValue::Text("9.99".into()),
            ],
            vec![
                ScalarValue::Text("Bruno".into()),
                ScalarValue::Int(30),
                ScalarValue::Null,
            ],
        ];
        let params = build_params(&schema, &rows).unwrap();
        assert_eq!(params.len(), 6);
        assert_eq!(format!("{:?}", params[3]), "\"Bruno\"");
        assert_eq!(format!("{:?}", params[4]), "30");
    }

    #[test]
    fn test_build_params_rejects_short_rows() {
        let rows = vec![vec![ScalarValue::Text("Ana".into())]];
        let err = build_params(&test_schema(), &rows).err().unwrap();
        assert!(matches!(
            err,
            PostgreSQLPopulatorError::RowShape {
                expected: 3,
                actual: 1
            }
        ));
    }
}
