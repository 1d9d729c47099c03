//! File-backed visit store
//!
//! Mirrors the logical layout on disk, one directory per entity:
//!
//! ```text
//! <data_dir>/entities/<urlencoded entityKey>/events.jsonl   append-only, one StoredVisit per line
//! <data_dir>/entities/<urlencoded entityKey>/metrics.json   replaced atomically
//! ```
//!
//! Appends are fsynced before returning. Lines that fail to parse are skipped
//! with a warning so one bad record does not hide the rest of the log. Every
//! non-empty line consumed an id when it was written, so the next id is taken
//! past the line count as well as past the highest parsed id. A torn final
//! line (no trailing newline) is closed off before the next record is written.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::types::{EventId, MetricsSnapshot, StoredVisit, VisitEvent};
use crate::utils::{atomic_write, cleanup_temp_files, next_recorded_at};

use super::store::{StoreError, StoreResult, VisitStore};

const ENTITIES_DIR: &str = "entities";
const EVENTS_FILE: &str = "events.jsonl";
const METRICS_FILE: &str = "metrics.json";

/// Parsed records of one entity log
struct LogScan {
    records: Vec<StoredVisit>,
    /// Non-empty lines, parseable or not
    lines: u64,
}

/// File-backed visit store
pub struct FileStore {
    data_dir: PathBuf,
    /// Serializes id and timestamp assignment with appends within this process
    append_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or create) a store rooted at `data_dir`.
    ///
    /// Removes temp files left behind by interrupted snapshot writes.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> StoreResult<Self> {
        let store = Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            append_lock: Mutex::new(()),
        };

        let entities_dir = store.entities_dir();
        fs::create_dir_all(&entities_dir)?;

        let mut cleaned = 0;
        for entry in fs::read_dir(&entities_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                cleaned += cleanup_temp_files(&path)?;
            }
        }
        if cleaned > 0 {
            debug!(cleaned, dir = %entities_dir.display(), "removed leftover temp files");
        }

        Ok(store)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn entities_dir(&self) -> PathBuf {
        self.data_dir.join(ENTITIES_DIR)
    }

    /// Directory for one entity; the key is percent-encoded (dots included)
    /// so that no key can name a path outside `entities/`.
    fn entity_dir(&self, entity_key: &str) -> PathBuf {
        let encoded = urlencoding::encode(entity_key).replace('.', "%2E");
        self.entities_dir().join(encoded)
    }

    fn events_path(&self, entity_key: &str) -> PathBuf {
        self.entity_dir(entity_key).join(EVENTS_FILE)
    }

    fn metrics_path(&self, entity_key: &str) -> PathBuf {
        self.entity_dir(entity_key).join(METRICS_FILE)
    }

    /// Load every parseable record from an entity's log, in file order
    fn load_log(&self, entity_key: &str) -> StoreResult<Vec<StoredVisit>> {
        Ok(self.scan_log(entity_key)?.records)
    }

    fn scan_log(&self, entity_key: &str) -> StoreResult<LogScan> {
        let events_path = self.events_path(entity_key);
        let mut records = Vec::new();
        let mut lines = 0;

        if !events_path.exists() {
            return Ok(LogScan { records, lines });
        }

        let reader = BufReader::new(File::open(&events_path)?);

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            lines += 1;

            match serde_json::from_str::<StoredVisit>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        entity_key,
                        line = line_num + 1,
                        error = %e,
                        "skipping unparseable visit record"
                    );
                }
            }
        }

        Ok(LogScan { records, lines })
    }
}

/// True when the file is non-empty and its last byte is not a newline
fn has_torn_tail(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl VisitStore for FileStore {
    fn append(&self, entity_key: &str, mut event: VisitEvent) -> StoreResult<EventId> {
        let _guard = self.append_lock.lock();

        let log = self.scan_log(entity_key)?;
        let high_water = log
            .records
            .iter()
            .map(|r| r.id.seq())
            .max()
            .unwrap_or(0)
            .max(log.lines);
        let id = EventId::new(high_water + 1);

        let last = log.records.iter().map(StoredVisit::recorded_at).max();
        event.recorded_at = next_recorded_at(event.recorded_at, last);

        let events_path = self.events_path(entity_key);
        if let Some(parent) = events_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&events_path)?;

        let mut line = serde_json::to_string(&StoredVisit::new(id, event))?;
        line.push('\n');
        if has_torn_tail(&mut file)? {
            warn!(entity_key, "closing torn final line before append");
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes())?;

        // Sync to disk for durability
        file.sync_all()?;

        Ok(id)
    }

    fn read_all(&self, entity_key: &str) -> StoreResult<BTreeMap<EventId, VisitEvent>> {
        let mut events = BTreeMap::new();
        for record in self.load_log(entity_key)? {
            if events.insert(record.id, record.event).is_some() {
                return Err(StoreError::Corrupted {
                    entity_key: entity_key.to_string(),
                    reason: format!("duplicate event id {}", record.id),
                });
            }
        }
        Ok(events)
    }

    fn entity_keys(&self) -> StoreResult<Vec<String>> {
        let entities_dir = self.entities_dir();
        if !entities_dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&entities_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.join(EVENTS_FILE).is_file() {
                continue;
            }

            let dir_name = entry.file_name();
            let Some(encoded) = dir_name.to_str() else {
                warn!(dir = %path.display(), "skipping entity directory with non UTF-8 name");
                continue;
            };

            match urlencoding::decode(encoded) {
                Ok(key) => keys.push(key.into_owned()),
                Err(e) => {
                    warn!(dir = %path.display(), error = %e, "skipping undecodable entity directory");
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn write_metrics(&self, entity_key: &str, snapshot: &MetricsSnapshot) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        atomic_write(self.metrics_path(entity_key), &json)?;
        Ok(())
    }

    fn read_metrics(&self, entity_key: &str) -> StoreResult<Option<MetricsSnapshot>> {
        let metrics_path = self.metrics_path(entity_key);
        if !metrics_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&metrics_path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupted {
                entity_key: entity_key.to_string(),
                reason: format!("unreadable metrics snapshot: {}", e),
            })
    }
}
