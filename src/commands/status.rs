use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::util::{ContentLayout, list_json_files};

pub fn run(args: StatusArgs) -> Result<()> {
    let layout = ContentLayout::new(&args.content_root);
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| layout.default_db_path());

    info!(content_root = %layout.root().display(), "status requested");

    for (stage, dir) in [
        ("phase-02", layout.canonical_dir()),
        ("phase-03", layout.html_dir()),
        ("phase-04", layout.merged_dir()),
        ("manifests", layout.manifest_dir()),
    ] {
        match stage_file_count(&dir)? {
            Some(files) => info!(stage, path = %dir.display(), files, "stage directory"),
            None => warn!(stage, path = %dir.display(), "stage directory missing"),
        }
    }

    if db_path.exists() {
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let dictionaries = query_count(&conn, "SELECT COUNT(*) FROM dictionaries").unwrap_or(0);
        let words = query_count(&conn, "SELECT COUNT(*) FROM words").unwrap_or(0);

        info!(
            path = %db_path.display(),
            dictionaries,
            words,
            "database status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}

fn stage_file_count(dir: &Path) -> Result<Option<usize>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    Ok(Some(list_json_files(dir)?.len()))
}

fn query_count(conn: &Connection, sql: &str) -> Result<i64> {
    let count = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
