//! File-backed store
//!
//! File layout:
//! - `defaults.fxkv`: header + append-only mutation records
//!
//! The whole log is replayed into an in-memory map on open, so reads never
//! touch the disk. Every mutation appends one record.
//!
//! A record cut short at the end of the file (a crash mid-append) is dropped
//! and the file truncated to the last complete record. Any other malformed
//! record fails the open and leaves the file as it is.
//!
//! The log is opened in append mode, so handles in several processes never
//! overwrite each other's records. Each handle only sees the entries present
//! when it was opened plus its own writes.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ahash::RandomState;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::parser::{
    create_header, encode_record, is_truncated, parse_header, parse_record, Record, FXKV_MAGIC,
    FXKV_VERSION, HEADER_LEN,
};
use crate::store::KeyValueStore;
use crate::value::RawValue;

/// Maximum value payload size (1 MB)
const MAX_VALUE_SIZE: usize = 1024 * 1024;

/// Data file name inside the store directory
const DATA_FILE: &str = "defaults.fxkv";

type Entries = HashMap<String, RawValue, RandomState>;

struct LogFile {
    file: File,
    records: u32,
}

/// FileStore persists entries across process restarts
pub struct FileStore {
    /// Path to the data file
    path: PathBuf,

    /// Data file handle and record count
    log: Mutex<LogFile>,

    /// Replayed view of the log
    entries: RwLock<Entries>,

    /// Is the store closed?
    closed: RwLock<bool>,
}

impl FileStore {
    /// Open or create a store in the given directory
    ///
    /// # Arguments
    /// * `dir` - Directory holding the data file
    ///
    /// # Returns
    /// * `Result<FileStore>` - Store handle with the log replayed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join(DATA_FILE);
        let (file, entries, records) = if path.exists() {
            Self::open_existing(&path)?
        } else {
            Self::create_new(&path)?
        };

        debug!(path = %path.display(), entries = entries.len(), records, "opened file store");

        Ok(FileStore {
            path,
            log: Mutex::new(LogFile { file, records }),
            entries: RwLock::new(entries),
            closed: RwLock::new(false),
        })
    }

    fn open_existing(path: &Path) -> Result<(File, Entries, u32)> {
        let mut file = OpenOptions::new().read(true).append(true).open(path)?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        if data.len() < HEADER_LEN {
            return Err(Error::Parse("File too short for header".to_string()));
        }

        let (mut rest, header) = parse_header(&data)?;
        if header.version != FXKV_VERSION {
            return Err(Error::Parse(format!(
                "Unsupported format version {}",
                header.version
            )));
        }

        let mut entries = Entries::default();
        let mut records = 0u32;
        while !rest.is_empty() {
            match parse_record(rest) {
                Ok((next, record)) => {
                    apply(&mut entries, record);
                    records += 1;
                    rest = next;
                }
                Err(err) if is_truncated(&err) => {
                    warn!(
                        path = %path.display(),
                        dropped_bytes = rest.len(),
                        "discarding incomplete trailing record"
                    );
                    break;
                }
                Err(err) => {
                    let offset = data.len() - rest.len();
                    return Err(Error::Parse(format!(
                        "Corrupt record {} at offset {}: {:?}",
                        records, offset, err
                    )));
                }
            }
        }

        let valid_len = (data.len() - rest.len()) as u64;
        if valid_len < data.len() as u64 {
            file.set_len(valid_len)?;
        }

        Ok((file, entries, records))
    }

    fn create_new(path: &Path) -> Result<(File, Entries, u32)> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create_new(true)
            .open(path)?;

        file.write_all(&create_header(FXKV_VERSION, 0))?;
        file.sync_all()?;

        Ok((file, Entries::default(), 0))
    }

    fn ensure_open(&self) -> Result<()> {
        if *self.closed.read() {
            return Err(Error::Closed);
        }
        Ok(())
    }

    fn append(&self, record: Record) -> Result<()> {
        let bytes = encode_record(&record);

        let mut log = self.log.lock();
        log.file.write_all(&bytes)?;
        log.records += 1;

        // Map update happens under the log lock so readers never observe
        // an entry the log does not yet hold.
        apply(&mut self.entries.write(), record);
        Ok(())
    }

    /// Rewrite the log so it holds exactly one record per live entry
    ///
    /// # Returns
    /// * `Result<()>` - Ok once the compacted file has replaced the old one
    pub fn compact(&self) -> Result<()> {
        self.ensure_open()?;

        let mut log = self.log.lock();
        let entries = self.entries.read();

        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();

        let tmp_path = self.path.with_extension("fxkv.tmp");
        let mut tmp = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;

        tmp.write_all(&create_header(FXKV_VERSION, keys.len() as u32))?;
        for key in &keys {
            let record = Record::Set {
                key: (*key).clone(),
                value: entries[*key].clone(),
            };
            tmp.write_all(&encode_record(&record))?;
        }
        tmp.sync_all()?;
        drop(tmp);
        fs::rename(&tmp_path, &self.path)?;

        let before = log.records;
        log.file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        log.records = keys.len() as u32;

        debug!(path = %self.path.display(), before, after = log.records, "compacted file store");
        Ok(())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Number of records in the log, including superseded ones
    pub fn record_count(&self) -> u32 {
        self.log.lock().records
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the store and fsync all changes
    pub fn close(&self) -> Result<()> {
        if *self.closed.read() {
            return Ok(());
        }

        let log = self.log.lock();
        log.file.sync_all()?;

        // The append handle cannot write in place; patch the header through
        // a second handle.
        let mut header = OpenOptions::new().write(true).open(&self.path)?;
        header.seek(SeekFrom::Start(FXKV_MAGIC.len() as u64 + 4))?;
        header.write_all(&log.records.to_le_bytes())?;
        header.sync_all()?;

        *self.closed.write() = true;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<RawValue>> {
        self.ensure_open()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: RawValue) -> Result<()> {
        self.ensure_open()?;

        if key.is_empty() {
            return Err(Error::InvalidKey(key.to_string()));
        }
        if value.payload_len() > MAX_VALUE_SIZE {
            return Err(Error::ValueTooLarge(value.payload_len()));
        }

        self.append(Record::Set {
            key: key.to_string(),
            value,
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.ensure_open()?;

        if !self.entries.read().contains_key(key) {
            return Ok(());
        }

        self.append(Record::Remove {
            key: key.to_string(),
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.ensure_open()?;

        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn apply(entries: &mut Entries, record: Record) {
    match record {
        Record::Set { key, value } => {
            entries.insert(key, value);
        }
        Record::Remove { key } => {
            entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_open() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.len(), 0);
        assert!(store.is_empty());

        store.close().unwrap();

        // Reopen
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("theme", RawValue::from("dark")).unwrap();

        assert_eq!(store.get("theme").unwrap(), Some(RawValue::from("dark")));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_persistence() {
        let dir = TempDir::new().unwrap();

        // Write data
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("count", RawValue::Int(3)).unwrap();
            store.set("flag", RawValue::Bool(true)).unwrap();
            store.set("blob", RawValue::Data(vec![1, 2, 3])).unwrap();
            store.set("count", RawValue::Int(4)).unwrap();
            store.close().unwrap();
        }

        // Reopen and verify
        {
            let store = FileStore::open(dir.path()).unwrap();
            assert_eq!(store.len(), 3);
            assert_eq!(store.record_count(), 4);
            assert_eq!(store.get("count").unwrap(), Some(RawValue::Int(4)));
            assert_eq!(store.get("flag").unwrap(), Some(RawValue::Bool(true)));
            assert_eq!(
                store.get("blob").unwrap(),
                Some(RawValue::Data(vec![1, 2, 3]))
            );
        }
    }

    #[test]
    fn test_remove_persists() {
        let dir = TempDir::new().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("k", RawValue::Int(1)).unwrap();
            store.remove("k").unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_absent_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.remove("never-set").unwrap();
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_value_too_large() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let result = store.set("big", RawValue::Data(vec![b'x'; MAX_VALUE_SIZE + 1]));
        assert!(matches!(result, Err(Error::ValueTooLarge(_))));
    }

    #[test]
    fn test_empty_key_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let result = store.set("", RawValue::Int(1));
        assert!(matches!(result, Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_truncated_tail_is_discarded() {
        let dir = TempDir::new().unwrap();
        let path;

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("kept", RawValue::from("yes")).unwrap();
            store.set("torn", RawValue::from("half written")).unwrap();
            store.close().unwrap();
            path = store.path().to_path_buf();
        }

        let full_len = fs::metadata(&path).unwrap().len();
        OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_len(full_len - 4)
            .unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("kept").unwrap(), Some(RawValue::from("yes")));
        assert_eq!(store.get("torn").unwrap(), None);

        // Appends land after the last complete record
        store.set("after", RawValue::Int(9)).unwrap();
        store.close().unwrap();
        drop(store);

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("after").unwrap(), Some(RawValue::Int(9)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_corrupt_record_mid_log_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path;

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("a", RawValue::Bool(true)).unwrap();
            for i in 0..5 {
                store.set(&format!("k{}", i), RawValue::Int(i)).unwrap();
            }
            store.close().unwrap();
            path = store.path().to_path_buf();
        }

        // Header, then tag + key length + "a", then the bool byte
        let mut data = fs::read(&path).unwrap();
        let bool_at = HEADER_LEN + 1 + 4 + 1;
        assert_eq!(data[bool_at], 1);
        data[bool_at] = 7;
        fs::write(&path, &data).unwrap();

        let result = FileStore::open(dir.path());
        assert!(matches!(result, Err(Error::Parse(_))));

        // Nothing was cut off the file
        assert_eq!(fs::read(&path).unwrap(), data);
    }

    #[test]
    fn test_unknown_tag_mid_log_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path;

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("first", RawValue::Int(1)).unwrap();
            store.set("second", RawValue::Int(2)).unwrap();
            path = store.path().to_path_buf();
        }

        let mut data = fs::read(&path).unwrap();
        data[HEADER_LEN] = 9;
        fs::write(&path, &data).unwrap();

        assert!(matches!(FileStore::open(dir.path()), Err(Error::Parse(_))));
        assert_eq!(fs::metadata(&path).unwrap().len(), data.len() as u64);
    }

    #[test]
    fn test_two_handles_do_not_overwrite_each_other() {
        let dir = TempDir::new().unwrap();

        {
            let first = FileStore::open(dir.path()).unwrap();
            let second = FileStore::open(dir.path()).unwrap();

            first.set("a", RawValue::Int(1)).unwrap();
            second.set("b", RawValue::Int(2)).unwrap();
            first.set("c", RawValue::Int(3)).unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("a").unwrap(), Some(RawValue::Int(1)));
        assert_eq!(store.get("b").unwrap(), Some(RawValue::Int(2)));
        assert_eq!(store.get("c").unwrap(), Some(RawValue::Int(3)));
    }

    #[test]
    fn test_invalid_header() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DATA_FILE), b"NOTAKVFILE-------").unwrap();

        let result = FileStore::open(dir.path());
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_compact() {
        let dir = TempDir::new().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            for i in 0..10 {
                store.set("counter", RawValue::Int(i)).unwrap();
            }
            store.set("gone", RawValue::Bool(true)).unwrap();
            store.remove("gone").unwrap();
            assert_eq!(store.record_count(), 12);

            store.compact().unwrap();
            assert_eq!(store.record_count(), 1);

            store.set("name", RawValue::from("after compaction")).unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.record_count(), 2);
        assert_eq!(store.get("counter").unwrap(), Some(RawValue::Int(9)));
        assert_eq!(
            store.get("name").unwrap(),
            Some(RawValue::from("after compaction"))
        );
    }

    #[test]
    fn test_close_writes_record_count() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("a", RawValue::Int(1)).unwrap();
        store.set("b", RawValue::Int(2)).unwrap();
        store.close().unwrap();

        let mut buf = Vec::new();
        File::open(store.path())
            .unwrap()
            .read_to_end(&mut buf)
            .unwrap();
        let (_, header) = parse_header(&buf).unwrap();
        assert_eq!(header.record_count, 2);
    }

    #[test]
    fn test_close_twice() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.close().unwrap();
        store.close().unwrap(); // Should not error
    }

    #[test]
    fn test_set_after_close() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.close().unwrap();

        assert!(matches!(store.set("k", RawValue::Int(1)), Err(Error::Closed)));
        assert!(matches!(store.get("k"), Err(Error::Closed)));
    }
}
