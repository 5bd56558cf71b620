//! # Result Store Module / 结果存储模块
//!
//! The durable case-status store. One SQLite row per case; single-row
//! updates commit before `update` returns, so a kill between any two cases
//! loses nothing. The presence of the `results` table is what
//! distinguishes a fresh run from a resumed one.
//!
//! 持久化的用例状态存储。每个用例一行 SQLite 记录；单行更新在 `update`
//! 返回前提交，因此在任意两个用例之间被杀死也不会丢失数据。
//! `results` 表是否存在区分了全新运行和续跑。

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::core::models::{CaseStatus, PendingCase, RunSummary, StatusCount};
use crate::infra::t;

/// A handle on the result database.
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Opens (creating if necessary) the result database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| t!("store.open_failed", path = path.display()))?;
        Self::with_connection(conn)
    }

    /// Opens a transient in-memory store. Test-support constructor.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // Updates must be on disk before `update` returns; WAL with relaxed
        // syncing would leave a window where a completed case re-runs.
        conn.execute_batch("PRAGMA synchronous=FULL;")?;
        Ok(Self { conn })
    }

    /// `true` if a previous initialization is durably present.
    pub fn is_initialized(&self) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='results'")?;
        Ok(stmt.exists([])?)
    }

    /// Creates one `NotExecuted` record per name, in iteration order, as a
    /// single transaction. Fails if the store is already initialized.
    ///
    /// Returns the number of records created.
    pub fn initialize<I>(&mut self, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        if self.is_initialized()? {
            bail!(t!("store.already_initialized"));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "CREATE TABLE results (name STRING, status STRING, output STRING)",
            [],
        )?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare("INSERT INTO results VALUES (?1, ?2, ?3)")?;
            for name in names {
                stmt.execute(params![name, CaseStatus::NotExecuted.as_str(), ""])?;
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// All records still in `NotExecuted`, in original insertion order.
    pub fn load_pending(&self) -> Result<Vec<PendingCase>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, rowid FROM results WHERE status=?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![CaseStatus::NotExecuted.as_str()], |row| {
            Ok(PendingCase {
                name: row.get(0)?,
                row: row.get(1)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Into::into)
    }

    /// Atomically overwrites status and output for exactly one record.
    /// The connection runs in autocommit mode, so the row is durable when
    /// this returns.
    pub fn update(&self, row: i64, status: CaseStatus, output: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE results SET status=?1, output=?2 WHERE rowid=?3",
            params![status.as_str(), output, row],
        )?;
        if changed != 1 {
            bail!(t!("store.update_missed", row = row));
        }
        Ok(())
    }

    /// Counts records grouped by status, largest group first, plus the
    /// total record count.
    pub fn summarize(&self) -> Result<RunSummary> {
        let total: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;

        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(status) FROM results \
             GROUP BY status ORDER BY COUNT(status) DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        let mut groups = Vec::new();
        for row in rows {
            let (status, count) = row?;
            groups.push(StatusCount {
                status: status.parse()?,
                count,
            });
        }
        Ok(RunSummary { total, groups })
    }
}
