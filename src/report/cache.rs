//! Short lived storage for rendered report images.
//!
//! Rendering a chart is slow compared with serving bytes from disk, so each
//! (report kind, period) pair is kept for [CACHE_TTL] after it is rendered.
//! Expired entries are overwritten the next time they are requested, they are
//! never swept.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
    time::SystemTime,
};

use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    report::{
        chart::BarChart,
        kind::{Period, ReportKind},
        query::get_report_rows,
        renderer::ChartRenderer,
    },
};

/// How long a rendered report is served before it is rendered again.
pub const CACHE_TTL: Duration = Duration::seconds(5);

/// A rendered report image and when it was rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The hash identifying the report kind and period.
    pub key: String,
    /// The image bytes.
    pub payload: Vec<u8>,
    /// When the image was rendered.
    pub created_at: OffsetDateTime,
}

/// Whether `entry` was created less than `ttl` before `now`.
///
/// Entries that claim to be created after `now` are treated as stale.
pub fn is_fresh(entry: &CacheEntry, now: OffsetDateTime, ttl: Duration) -> bool {
    let age = now - entry.created_at;

    age >= Duration::ZERO && age < ttl
}

/// The cache key for a report: the lowercase hex MD5 hash of `{kind}_{period}`.
pub fn cache_key(kind: ReportKind, period: &Period) -> String {
    format!("{:x}", md5::compute(format!("{kind}_{period}")))
}

/// Somewhere to keep cache entries.
pub trait CacheStore: std::fmt::Debug + Send + Sync {
    /// Get the entry for `key`, or `None` if there is no entry.
    ///
    /// # Errors
    /// Returns an [Error::CacheIo] if the store could not be read.
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, Error>;

    /// Store `entry`, replacing any entry with the same key.
    ///
    /// # Errors
    /// Returns an [Error::CacheIo] if the store could not be written.
    fn save(&self, entry: &CacheEntry) -> Result<(), Error>;
}

/// Keeps each entry as `<key>.png` in a directory, using the file's
/// modification time as the entry's creation time.
#[derive(Debug, Clone)]
pub struct DirectoryCacheStore {
    directory: PathBuf,
}

impl DirectoryCacheStore {
    /// Create a store in `directory`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an [Error::CacheIo] if the directory could not be created.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, Error> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;

        Ok(Self { directory })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.png"))
    }
}

impl CacheStore for DirectoryCacheStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let path = self.path_for(key);

        let payload = match fs::read(&path) {
            Ok(payload) => payload,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        let modified = fs::metadata(&path)?.modified()?;

        Ok(Some(CacheEntry {
            key: key.to_owned(),
            payload,
            created_at: OffsetDateTime::from(modified),
        }))
    }

    fn save(&self, entry: &CacheEntry) -> Result<(), Error> {
        let path = self.path_for(&entry.key);

        fs::write(&path, &entry.payload)?;
        File::options()
            .write(true)
            .open(&path)?
            .set_modified(SystemTime::from(entry.created_at))?;

        Ok(())
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::CacheIo("memory cache lock poisoned".to_owned()))?;

        Ok(entries.get(key).cloned())
    }

    fn save(&self, entry: &CacheEntry) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::CacheIo("memory cache lock poisoned".to_owned()))?;
        entries.insert(entry.key.clone(), entry.clone());

        Ok(())
    }
}

/// Serves report images, rendering them again once they are older than the TTL.
#[derive(Debug)]
pub struct ReportCache {
    store: Box<dyn CacheStore>,
    renderer: Box<dyn ChartRenderer>,
    ttl: Duration,
}

impl ReportCache {
    /// Create a cache with the default TTL of [CACHE_TTL].
    pub fn new(store: impl CacheStore + 'static, renderer: impl ChartRenderer + 'static) -> Self {
        Self {
            store: Box::new(store),
            renderer: Box::new(renderer),
            ttl: CACHE_TTL,
        }
    }

    /// Replace the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Get the image for the report `kind` over `period`.
    ///
    /// # Errors
    /// Returns an error if the report could not be queried or rendered.
    pub fn get_or_render(
        &self,
        kind: ReportKind,
        period: &Period,
        db_connection: &Mutex<Connection>,
    ) -> Result<Vec<u8>, Error> {
        self.get_or_render_at(kind, period, db_connection, OffsetDateTime::now_utc())
    }

    /// Get the image for the report `kind` over `period` as of `now`.
    ///
    /// A cached image is returned as is if it is still fresh at `now`.
    /// Otherwise the report is queried and rendered again, and the new image
    /// replaces the cached one. Failing to read or write the store is logged
    /// and does not fail the request.
    ///
    /// `db_connection` is only locked while the report is queried, it is
    /// released before the chart is rendered.
    ///
    /// # Errors
    /// Returns an error if the database lock is poisoned, or if the report
    /// could not be queried or rendered.
    pub fn get_or_render_at(
        &self,
        kind: ReportKind,
        period: &Period,
        db_connection: &Mutex<Connection>,
        now: OffsetDateTime,
    ) -> Result<Vec<u8>, Error> {
        let key = cache_key(kind, period);

        let cached = self
            .store
            .load(&key)
            .inspect_err(|error| {
                tracing::error!("Could not read cached report {kind} for {period}: {error}")
            })
            .ok()
            .flatten();

        if let Some(entry) = cached {
            if is_fresh(&entry, now, self.ttl) {
                tracing::debug!("Cache hit for report {kind} for {period}");
                return Ok(entry.payload);
            }
        }

        tracing::debug!("Cache miss for report {kind} for {period}, rendering");

        let rows = {
            let connection = db_connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| Error::DatabaseLockError)?;

            get_report_rows(kind, period, &connection)?
        };

        let chart = BarChart::new(kind, period, &rows)?;
        let payload = self.renderer.render(&chart)?;

        let entry = CacheEntry {
            key,
            payload,
            created_at: now,
        };

        if let Err(error) = self.store.save(&entry) {
            tracing::error!("Could not cache report {kind} for {period}: {error}");
        }

        Ok(entry.payload)
    }
}
