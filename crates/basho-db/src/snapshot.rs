use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::rows::{CityRow, PrefectureRow, Tables};
use crate::traits::{PrefectureKey, TableStore, CITIES_TABLE, PREFECTURES_TABLE};

/// Snapshot file magic.
const MAGIC: &[u8; 4] = b"BSHO";

/// Current snapshot format version.
const FORMAT_VERSION: u32 = 1;

/// Header size: magic + version + CRC + payload length.
const HEADER_SIZE: usize = 4 + 4 + 4 + 8;

/// Tables persisted to a single snapshot file.
///
/// On-disk format:
/// ```text
/// [4 bytes: magic "BSHO"]
/// [4 bytes: format version (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [8 bytes: payload length (little-endian u64)]
/// [N bytes: payload (bincode-serialized Tables)]
/// ```
///
/// The file is read once on [`open`](Self::open) and queries are served from
/// the loaded tables. [`replace_all`](TableStore::replace_all) writes a new
/// file beside the old one and renames it into place.
pub struct SnapshotTableStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl SnapshotTableStore {
    /// Open an existing snapshot file.
    ///
    /// Fails if the file is missing, has a bad header, or fails its checksum.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let tables = decode(&bytes)?;
        info!(
            path = %path.display(),
            prefectures = tables.prefectures.len(),
            cities = tables.cities.len(),
            "opened table snapshot"
        );
        Ok(Self {
            path: path.to_path_buf(),
            tables: RwLock::new(tables),
        })
    }

    /// Create (or truncate) a snapshot file holding empty tables.
    pub fn create(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tables = Tables::default();
        write_atomically(path, &tables)?;
        Ok(Self {
            path: path.to_path_buf(),
            tables: RwLock::new(tables),
        })
    }

    /// Open the snapshot at `path`, creating an empty one if it does not exist.
    pub fn open_or_create(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableStore for SnapshotTableStore {
    fn has_table(&self, name: &str) -> DbResult<bool> {
        Ok(name == PREFECTURES_TABLE || name == CITIES_TABLE)
    }

    fn all_prefectures(&self) -> DbResult<Vec<PrefectureRow>> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(tables.prefectures.values().cloned().collect())
    }

    fn find_prefecture(&self, key: PrefectureKey<'_>) -> DbResult<Option<PrefectureRow>> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(match key {
            PrefectureKey::Code(code) => tables.prefectures.get(&code).cloned(),
            _ => tables.prefectures.values().find(|row| key.matches(row)).cloned(),
        })
    }

    fn find_city(&self, code: &str) -> DbResult<Option<CityRow>> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(tables.cities.get(code).cloned())
    }

    fn cities_in_prefecture(&self, prefecture_code: u8) -> DbResult<Vec<CityRow>> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(tables.active_cities_in(prefecture_code))
    }

    fn replace_all(&self, prefectures: Vec<PrefectureRow>, cities: Vec<CityRow>) -> DbResult<()> {
        let next = Tables::from_rows(prefectures, cities);
        let mut tables = self.tables.write().expect("lock poisoned");
        write_atomically(&self.path, &next)?;
        *tables = next;
        Ok(())
    }
}

impl fmt::Debug for SnapshotTableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read().expect("lock poisoned");
        f.debug_struct("SnapshotTableStore")
            .field("path", &self.path)
            .field("prefectures", &tables.prefectures.len())
            .field("cities", &tables.cities.len())
            .finish()
    }
}

fn encode(tables: &Tables) -> DbResult<Vec<u8>> {
    let payload = bincode::serialize(tables).map_err(|e| DbError::Serialization(e.to_string()))?;
    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode(bytes: &[u8]) -> DbResult<Tables> {
    if bytes.len() < HEADER_SIZE {
        return Err(DbError::CorruptSnapshot(format!(
            "file is {} bytes, shorter than the {HEADER_SIZE}-byte header",
            bytes.len()
        )));
    }
    if &bytes[0..4] != MAGIC {
        return Err(DbError::CorruptSnapshot("bad magic".to_string()));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(DbError::UnsupportedVersion(version));
    }

    let expected = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[12..HEADER_SIZE]);
    let len = u64::from_le_bytes(len_bytes) as usize;

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != len {
        return Err(DbError::CorruptSnapshot(format!(
            "payload is {} bytes, header says {len}",
            payload.len()
        )));
    }

    let computed = crc32fast::hash(payload);
    if computed != expected {
        return Err(DbError::ChecksumMismatch { expected, computed });
    }

    bincode::deserialize(payload).map_err(|e| DbError::Serialization(e.to_string()))
}

fn write_atomically(path: &Path, tables: &Tables) -> DbResult<()> {
    let bytes = encode(tables)?;
    let tmp = path.with_extension("tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote table snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use basho_types::PrefectureType;

    fn hokkaido() -> PrefectureRow {
        PrefectureRow {
            code: 1,
            name: "北海道".into(),
            name_en: "Hokkaido".into(),
            name_kana: "ホッカイドウ".into(),
            name_hiragana: "ほっかいどう".into(),
            region_name: "北海道".into(),
            prefecture_type: PrefectureType::Do,
            capital_code: "011002".into(),
        }
    }

    fn sapporo() -> CityRow {
        CityRow {
            code: "011002".into(),
            prefecture_code: 1,
            name: "札幌市".into(),
            name_kana: "サッポロシ".into(),
            district: None,
            capital: true,
            deprecated_at: None,
            successor_code: None,
        }
    }

    #[test]
    fn create_then_open_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basho.db");
        SnapshotTableStore::create(&path).unwrap();

        let store = SnapshotTableStore::open(&path).unwrap();
        assert!(store.has_schema().unwrap());
        assert!(store.all_prefectures().unwrap().is_empty());
    }

    #[test]
    fn replace_all_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("basho.db");
        let store = SnapshotTableStore::create(&path).unwrap();
        store.replace_all(vec![hokkaido()], vec![sapporo()]).unwrap();
        drop(store);

        let reopened = SnapshotTableStore::open(&path).unwrap();
        assert_eq!(reopened.all_prefectures().unwrap(), vec![hokkaido()]);
        assert_eq!(reopened.find_city("011002").unwrap(), Some(sapporo()));
        assert_eq!(reopened.cities_in_prefecture(1).unwrap().len(), 1);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SnapshotTableStore::open(dir.path().join("absent.db"));
        assert!(matches!(result, Err(DbError::Io(_))));
    }

    #[test]
    fn open_or_create_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basho.db");
        let store = SnapshotTableStore::open_or_create(&path).unwrap();
        store.replace_all(vec![hokkaido()], vec![]).unwrap();

        let again = SnapshotTableStore::open_or_create(&path).unwrap();
        assert_eq!(again.all_prefectures().unwrap().len(), 1);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basho.db");
        fs::write(&path, vec![0u8; 64]).unwrap();
        assert!(matches!(
            SnapshotTableStore::open(&path),
            Err(DbError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn short_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basho.db");
        fs::write(&path, b"BSHO").unwrap();
        assert!(matches!(
            SnapshotTableStore::open(&path),
            Err(DbError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = encode(&Tables::default()).unwrap();
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(DbError::UnsupportedVersion(7))));
    }

    #[test]
    fn flipped_payload_byte_fails_checksum() {
        let tables = Tables::from_rows(vec![hokkaido()], vec![sapporo()]);
        let mut bytes = encode(&tables).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(decode(&bytes), Err(DbError::ChecksumMismatch { .. })));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let tables = Tables::from_rows(vec![hokkaido()], vec![]);
        let bytes = encode(&tables).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() - 3]),
            Err(DbError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn encode_decode_round_trip() {
        let tables = Tables::from_rows(vec![hokkaido()], vec![sapporo()]);
        assert_eq!(decode(&encode(&tables).unwrap()).unwrap(), tables);
    }
}
