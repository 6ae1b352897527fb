//! Table administration command handlers.

use anyhow::Context;
use bench_core::TableSchema;
use loadtest_populate_postgresql::TableAdmin;
use std::io::{BufRead, Write};
use std::path::Path;

/// Ask a yes/no question; only an answer starting with `y` or `s` confirms.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> anyhow::Result<bool> {
    write!(output, "{prompt} (y/n): ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().chars().next(),
        Some('y') | Some('s')
    ))
}

fn confirm_on_stdin(prompt: &str) -> anyhow::Result<bool> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    confirm(prompt, &mut input, &mut output)
}

/// Create the table from the column schema file.
pub async fn create_table(admin: &TableAdmin, schema_path: &Path, table_name: &str) -> anyhow::Result<()> {
    let schema = TableSchema::from_file(schema_path)
        .with_context(|| format!("Failed to load schema from {schema_path:?}"))?;
    admin
        .create_table(table_name, &schema)
        .await
        .with_context(|| format!("Failed to create table '{table_name}'"))?;
    println!("Table '{table_name}' created ({} columns).", schema.len() + 1);
    Ok(())
}

/// Delete every row after confirmation.
pub async fn clear_table(admin: &TableAdmin, table_name: &str, yes: bool) -> anyhow::Result<()> {
    if !yes && !confirm_on_stdin(&format!("Delete all rows from table '{table_name}'?"))? {
        println!("Aborted.");
        return Ok(());
    }
    let deleted = admin
        .clear_table(table_name)
        .await
        .with_context(|| format!("Failed to clear table '{table_name}'"))?;
    println!("Deleted {deleted} rows from '{table_name}'.");
    Ok(())
}

/// Drop the table after confirmation.
pub async fn drop_table(admin: &TableAdmin, table_name: &str, yes: bool) -> anyhow::Result<()> {
    if !yes && !confirm_on_stdin(&format!("Drop table '{table_name}' completely?"))? {
        println!("Aborted.");
        return Ok(());
    }
    admin
        .drop_table(table_name)
        .await
        .with_context(|| format!("Failed to drop table '{table_name}'"))?;
    println!("Table '{table_name}' dropped.");
    Ok(())
}

/// Print the tables of the public schema.
pub async fn list_tables(admin: &TableAdmin) -> anyhow::Result<()> {
    let tables = admin.list_tables().await.context("Failed to list tables")?;
    println!("Tables in the public schema:");
    for table in tables {
        println!("- {table}");
    }
    Ok(())
}

/// Print the table's row count.
pub async fn count_rows(admin: &TableAdmin, table_name: &str) -> anyhow::Result<()> {
    let count = admin
        .count_rows(table_name)
        .await
        .with_context(|| format!("Failed to count rows in '{table_name}'"))?;
    println!("Table '{table_name}' contains {count} rows.");
    Ok(())
}

/// Print the first `limit` rows.
pub async fn show_rows(admin: &TableAdmin, table_name: &str, limit: u64) -> anyhow::Result<()> {
    let rows = admin
        .show_rows(table_name, limit)
        .await
        .with_context(|| format!("Failed to read rows from '{table_name}'"))?;
    print!("{}", rows.to_table_string());
    println!("({} rows)", rows.rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(answer: &str) -> (bool, String) {
        let mut input = answer.as_bytes();
        let mut output = Vec::new();
        let confirmed = confirm("Drop table 't'?", &mut input, &mut output).unwrap();
        (confirmed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_confirm_accepts_yes() {
        assert!(ask("y\n").0);
        assert!(ask("Yes\n").0);
        assert!(ask("s\n").0);
    }

    #[test]
    fn test_confirm_rejects_everything_else() {
        assert!(!ask("n\n").0);
        assert!(!ask("\n").0);
        assert!(!ask("").0);
        assert!(!ask("maybe\n").0);
    }

    #[test]
    fn test_confirm_prints_prompt() {
        assert_eq!(ask("n\n").1, "Drop table 't'? (y/n): ");
    }
}
