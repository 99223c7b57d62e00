//! SQLite dumps in replayable SQL text form
//!
//! The output is one transaction: table definitions, their rows as
//! `INSERT` statements, then indexes, triggers and views. Feeding it to
//! `execute_batch` on an empty database recreates the source schema and rows.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{VaultError, VaultResult};

use super::{DatabaseRecord, Dumper};

/// Dumps SQLite databases through a read-only connection
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDumper;

impl SqliteDumper {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> rusqlite::Result<Connection> {
        Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }
}

impl Dumper for SqliteDumper {
    fn dump(&self, record: &DatabaseRecord) -> VaultResult<Vec<u8>> {
        let conn = Self::open(record.path())
            .map_err(|e| VaultError::dump(record.base_name(), e.to_string()))?;

        let lines =
            dump_lines(&conn).map_err(|e| VaultError::dump(record.base_name(), e.to_string()))?;

        debug!(
            database = record.base_name(),
            statements = lines.len(),
            "Dumped database"
        );

        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text.into_bytes())
    }
}

/// Produce the dump of an open connection, one statement per element
pub fn dump_lines(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut lines = vec!["BEGIN TRANSACTION;".to_string()];
    let mut sequence = Vec::new();
    let mut writable_schema = false;

    let tables: Vec<(String, String)> = {
        let mut stmt = conn.prepare(
            "SELECT name, sql FROM sqlite_master \
             WHERE sql NOT NULL AND type = 'table' ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    for (name, sql) in &tables {
        if name == "sqlite_sequence" {
            sequence.push("DELETE FROM \"sqlite_sequence\";".to_string());
            sequence.extend(insert_statements(conn, name)?);
            continue;
        } else if name == "sqlite_stat1" {
            lines.push("ANALYZE sqlite_master;".to_string());
            continue;
        } else if name.starts_with("sqlite_") {
            continue;
        } else if sql.starts_with("CREATE VIRTUAL TABLE") {
            // Virtual tables can't be created inside a transaction the usual way
            if !writable_schema {
                lines.push("PRAGMA writable_schema=ON;".to_string());
                writable_schema = true;
            }
            lines.push(format!(
                "INSERT INTO sqlite_master(type,name,tbl_name,rootpage,sql) VALUES('table',{},{},0,{});",
                quote_literal(name),
                quote_literal(name),
                quote_literal(sql)
            ));
            continue;
        }

        lines.push(format!("{};", sql));
        lines.extend(insert_statements(conn, name)?);
    }

    {
        let mut stmt = conn.prepare(
            "SELECT sql FROM sqlite_master \
             WHERE sql NOT NULL AND type IN ('index', 'trigger', 'view')",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        for sql in rows {
            lines.push(format!("{};", sql?));
        }
    }

    lines.extend(sequence);
    if writable_schema {
        lines.push("PRAGMA writable_schema=OFF;".to_string());
    }
    lines.push("COMMIT;".to_string());

    Ok(lines)
}

/// Build one `INSERT` per row, with values rendered by SQLite's `quote()`
fn insert_statements(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let columns: Vec<String> = {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let values = columns
        .iter()
        .map(|c| format!("quote({})", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(" || ',' || ");

    let query = format!(
        "SELECT 'INSERT INTO ' || {} || ' VALUES(' || {} || ')' FROM {}",
        quote_literal(&quote_ident(table)),
        values,
        quote_ident(table)
    );

    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut inserts = Vec::new();
    for insert in rows {
        inserts.push(format!("{};", insert?));
    }
    Ok(inserts)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
