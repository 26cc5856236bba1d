use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Storage-layer error taxonomy. Unique/primary-key constraint violations
/// are classified here so callers see the domain "already exists" error
/// rather than a raw SQLite failure.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("unknown {kind} reference: {id}")]
    MissingReference { kind: &'static str, id: String },

    #[error("database lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl DbError {
    /// Map a rusqlite error to `Conflict(what)` when it is a uniqueness or
    /// primary-key constraint violation, keeping everything else as-is.
    pub fn classify_conflict(err: rusqlite::Error, what: &'static str) -> Self {
        if is_unique_violation(&err) {
            DbError::Conflict(what)
        } else {
            DbError::Sqlite(err)
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    // SQLITE_CONSTRAINT_PRIMARYKEY (1555) and SQLITE_CONSTRAINT_UNIQUE (2067).
    // Foreign-key and CHECK failures share the primary code, so match on the
    // extended code.
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
