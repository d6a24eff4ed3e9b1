use crate::codec::{decode_frames, decode_header, encode_frame, encode_header};
use crate::lock::io_error;
use potash::errors::PotashResult;
use potash::store::{StoreSnapshot, WriteBatch};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// The append-only log of committed batches.
pub(crate) struct LogFile {
    path: PathBuf,
    file: File,
}

impl LogFile {
    /// Opens the log at `path`, creating it with a fresh header when it
    /// does not exist, and replays it into a snapshot.
    ///
    /// A partially written frame at the end is cut off, keeping every
    /// complete frame before it.
    ///
    /// # Errors
    /// `Corruption` when the header or any complete frame fails validation.
    pub(crate) fn open(path: &Path) -> PotashResult<(LogFile, StoreSnapshot)> {
        let exists = path.exists();
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| io_error("Failed to open log file", e))?;

        let mut snapshot = StoreSnapshot::new();
        let mut bytes = Vec::new();
        if exists {
            file.read_to_end(&mut bytes)
                .map_err(|e| io_error("Failed to read log file", e))?;
        }

        if bytes.is_empty() {
            file.write_all(&encode_header())
                .and_then(|_| file.sync_all())
                .map_err(|e| io_error("Failed to write log header", e))?;
            log::info!("Created log file {}", path.display());
        } else {
            let offset = decode_header(&bytes).inspect_err(|e| log::error!("{}: {}", path.display(), e))?;
            let decoded = decode_frames(&bytes, offset).inspect_err(|e| log::error!("{}: {}", path.display(), e))?;
            if decoded.valid_len < bytes.len() {
                log::warn!(
                    "Discarding {} bytes of an incomplete frame at the end of {}",
                    bytes.len() - decoded.valid_len,
                    path.display()
                );
                file.set_len(decoded.valid_len as u64)
                    .and_then(|_| file.sync_all())
                    .map_err(|e| io_error("Failed to truncate log file", e))?;
            }
            for batch in &decoded.batches {
                snapshot.apply(batch);
            }
            log::info!(
                "Replayed {} batches into {} maps from {}",
                decoded.batches.len(),
                snapshot.map_count(),
                path.display()
            );
        }

        Ok((
            LogFile {
                path: path.to_path_buf(),
                file,
            },
            snapshot,
        ))
    }

    /// Appends `batch` as one frame.
    ///
    /// A failed write is cut back off so later frames follow the last
    /// complete one.
    pub(crate) fn append(&mut self, batch: &WriteBatch, sync: bool) -> PotashResult<()> {
        let frame = encode_frame(batch)?;
        let before = self.len()?;
        if let Err(e) = self.file.write_all(&frame) {
            if let Err(truncate) = self.file.set_len(before) {
                log::error!("Failed to cut off partial frame: {}", truncate);
            }
            return Err(io_error("Failed to append to log file", e));
        }
        if sync {
            self.sync()?;
        }
        Ok(())
    }

    pub(crate) fn sync(&self) -> PotashResult<()> {
        self.file.sync_data().map_err(|e| io_error("Failed to sync log file", e))
    }

    /// Rewrites the log as a single frame holding `snapshot`.
    ///
    /// The new log is written to `compact_path`, synced and renamed over the
    /// current one, so a crash leaves either the old or the new log intact.
    pub(crate) fn compact(&mut self, snapshot: &StoreSnapshot, compact_path: &Path) -> PotashResult<()> {
        let mut bytes = encode_header();
        bytes.extend(encode_frame(&snapshot.to_batch())?);

        let mut compacted = File::create(compact_path).map_err(|e| io_error("Failed to create compaction file", e))?;
        compacted
            .write_all(&bytes)
            .and_then(|_| compacted.sync_all())
            .map_err(|e| io_error("Failed to write compaction file", e))?;
        drop(compacted);

        fs::rename(compact_path, &self.path).map_err(|e| io_error("Failed to replace log file", e))?;
        self.file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error("Failed to reopen log file", e))?;
        log::info!("Compacted {} to {} bytes", self.path.display(), bytes.len());
        Ok(())
    }

    pub(crate) fn len(&self) -> PotashResult<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| io_error("Failed to read log file size", e))
    }
}
