//! FILENAME: src/transfer.rs
// PURPOSE: Privileged handlers behind the "export-data" and "import-data"
//          channels. Export writes the opaque payload as a timestamped JSON
//          snapshot; import returns the latest snapshot's payload.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Local;
use serde_json::{json, Value};

use crate::log_info;

/// Snapshot store shared by the export and import handlers.
pub struct ExportStore {
    dir: PathBuf,
    last_export: Mutex<Option<PathBuf>>,
    /// Continues from the highest sequence already on disk. Sequence numbers
    /// never repeat for a directory, so snapshot names stay unique and
    /// lexically ordered across process restarts.
    seq: AtomicU64,
}

impl ExportStore {
    pub fn new(dir: PathBuf) -> Result<Self, String> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create export dir at {:?}: {}", dir, e))?;
        let seq = AtomicU64::new(crate::highest_file_seq(&dir, "export-", ".json"));
        Ok(ExportStore {
            dir,
            last_export: Mutex::new(None),
            seq,
        })
    }

    /// Handler entry point for the "export-data" channel. The payload is
    /// written exactly as received; no reshaping.
    pub fn export(&self, data: &Value) -> Result<Value, String> {
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.dir.join(format!("export-{}-{:05}.json", stamp, seq));

        let contents = serde_json::to_string_pretty(data)
            .map_err(|e| format!("Failed to serialize export payload: {}", e))?;
        std::fs::write(&path, &contents)
            .map_err(|e| format!("Failed to write export to {:?}: {}", path, e))?;

        *self.last_export.lock().map_err(|e| e.to_string())? = Some(path.clone());

        log_info!("EXPORT", "Wrote snapshot {:?} ({} bytes)", path, contents.len());

        Ok(json!({
            "path": path.to_string_lossy(),
            "bytes": contents.len(),
        }))
    }

    /// Handler entry point for the "import-data" channel. Returns the payload
    /// of the snapshot recorded by this process, falling back to the lexically
    /// newest snapshot on disk.
    pub fn import(&self) -> Result<Value, String> {
        let path = match self.last_export.lock().map_err(|e| e.to_string())?.clone() {
            Some(path) => path,
            None => self
                .newest_snapshot()?
                .ok_or_else(|| "No export snapshot available".to_string())?,
        };

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read export {:?}: {}", path, e))?;
        let data: Value = serde_json::from_str(&contents)
            .map_err(|e| format!("Corrupt export {:?}: {}", path, e))?;

        log_info!("IMPORT", "Read snapshot {:?}", path);

        Ok(data)
    }

    /// Lexically newest `export-*.json` in the export directory. Names carry
    /// a timestamp plus a sequence that never repeats for a directory, so
    /// lexical order is creation order even across process restarts.
    fn newest_snapshot(&self) -> Result<Option<PathBuf>, String> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| format!("Failed to read export dir {:?}: {}", self.dir, e))?;

        let mut newest: Option<PathBuf> = None;
        for entry in entries {
            let path = entry.map_err(|e| e.to_string())?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if !name.starts_with("export-") || !name.ends_with(".json") {
                continue;
            }
            let is_newer = match &newest {
                Some(current) => path.file_name() > current.file_name(),
                None => true,
            };
            if is_newer {
                newest = Some(path);
            }
        }
        Ok(newest)
    }
}
