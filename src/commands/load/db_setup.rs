use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::model::{DictionaryInfo, MergedIndex};
use crate::util::{ensure_directory, now_utc_string};

use super::DictionarySink;

const DB_SCHEMA_VERSION: &str = "1.0.0";

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS dictionaries (
          id INTEGER PRIMARY KEY NOT NULL,
          title TEXT NOT NULL,
          from_lang TEXT NOT NULL,
          to_lang TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS words (
          word TEXT PRIMARY KEY NOT NULL,
          entries TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_word ON words(word);
        ",
        )
        .context("failed to create dictionary schema")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('loaded_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

fn sidecar_path(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(db_path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// SQLite file holding `dictionaries` and `words`, rebuilt from scratch on
/// every load.
#[derive(Debug)]
pub(crate) struct SqliteSink {
    connection: Connection,
}

impl SqliteSink {
    pub(crate) fn create(db_path: &Path) -> Result<Self> {
        for suffix in ["", "-wal", "-shm"] {
            let path = sidecar_path(db_path, suffix);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("failed to remove {}", path.display()))?;
            }
        }
        if let Some(parent) = db_path.parent() {
            ensure_directory(parent)?;
        }

        let connection = Connection::open(db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;

        Ok(Self { connection })
    }

    /// Folds the write-ahead log back into the main file so the database is a
    /// single self-contained file once closed.
    pub(crate) fn close(self) -> Result<()> {
        self.connection
            .pragma_update(None, "journal_mode", "DELETE")
            .context("failed to set journal_mode=DELETE")?;
        self.connection
            .close()
            .map_err(|(_, err)| err)
            .context("failed to close database")
    }
}

impl DictionarySink for SqliteSink {
    fn load_dictionaries(&mut self, dictionaries: &[DictionaryInfo]) -> Result<usize> {
        let tx = self.connection.transaction()?;

        {
            let mut statement = tx.prepare(
                "INSERT INTO dictionaries(id, title, from_lang, to_lang) VALUES(?1, ?2, ?3, ?4)",
            )?;

            for dictionary in dictionaries {
                statement
                    .execute(params![
                        dictionary.id,
                        &dictionary.title,
                        &dictionary.from_lang,
                        &dictionary.to_lang
                    ])
                    .with_context(|| {
                        format!(
                            "failed to insert dictionary {} ({})",
                            dictionary.id, dictionary.title
                        )
                    })?;
            }
        }

        tx.commit()?;
        Ok(dictionaries.len())
    }

    fn load_words(&mut self, index: &MergedIndex) -> Result<usize> {
        let tx = self.connection.transaction()?;

        {
            let mut statement = tx.prepare("INSERT INTO words(word, entries) VALUES(?1, ?2)")?;

            for (word, entries) in index {
                let encoded = serde_json::to_string(entries)
                    .with_context(|| format!("failed to encode entries for {word}"))?;
                statement
                    .execute(params![word, encoded])
                    .with_context(|| format!("failed to insert word {word}"))?;
            }
        }

        tx.commit()?;
        Ok(index.len())
    }
}
