use potash::errors::{ErrorKind, PotashError};
use potash::store::WriteBatch;
use thiserror::Error;

/// Magic bytes every log file starts with.
pub(crate) const MAGIC: &[u8; 8] = b"POTASHDB";
pub(crate) const FORMAT_MAJOR: u16 = 1;
pub(crate) const FORMAT_MINOR: u16 = 0;
pub(crate) const HEADER_LEN: usize = MAGIC.len() + 4;
/// Payload length and checksum in front of every frame.
const FRAME_HEADER_LEN: usize = 8;

/// Why the log file could not be written or read back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileCodecError {
    #[error("Serialization failed: {0}")]
    Encode(String),
    #[error("Deserialization of frame at offset {offset} failed: {message}")]
    Decode { offset: usize, message: String },
    #[error("Log file does not start with the expected magic bytes")]
    BadMagic,
    #[error("Unsupported log format version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("Checksum mismatch in frame at offset {offset}")]
    ChecksumMismatch { offset: usize },
}

impl From<FileCodecError> for PotashError {
    fn from(err: FileCodecError) -> Self {
        let kind = match err {
            FileCodecError::Encode(_) => ErrorKind::EncodingError,
            _ => ErrorKind::Corruption,
        };
        PotashError::new(&err.to_string(), kind)
    }
}

pub(crate) type CodecResult<T> = Result<T, FileCodecError>;

pub(crate) fn encode_header() -> Vec<u8> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&FORMAT_MAJOR.to_le_bytes());
    header.extend_from_slice(&FORMAT_MINOR.to_le_bytes());
    header
}

/// Checks the header and returns the offset of the first frame.
///
/// Files written by a newer minor version of the same major format are
/// accepted.
pub(crate) fn decode_header(bytes: &[u8]) -> CodecResult<usize> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(FileCodecError::BadMagic);
    }
    let major = u16::from_le_bytes([bytes[8], bytes[9]]);
    let minor = u16::from_le_bytes([bytes[10], bytes[11]]);
    if major != FORMAT_MAJOR {
        return Err(FileCodecError::UnsupportedVersion { major, minor });
    }
    Ok(HEADER_LEN)
}

/// Encodes `batch` as one `[len][crc32][payload]` frame.
pub(crate) fn encode_frame(batch: &WriteBatch) -> CodecResult<Vec<u8>> {
    let payload = bincode::serde::encode_to_vec(batch, bincode::config::standard())
        .map_err(|e| FileCodecError::Encode(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| FileCodecError::Encode(format!("Frame of {} bytes is too large", payload.len())))?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Frames replayed from a log.
#[derive(Debug, PartialEq)]
pub(crate) struct DecodedFrames {
    pub(crate) batches: Vec<WriteBatch>,
    /// End of the last complete frame. Shorter than the input when the log
    /// ends in a partially written frame.
    pub(crate) valid_len: usize,
}

/// Decodes every frame of `bytes` starting at `offset`.
///
/// An incomplete frame at the end is the trace of an interrupted append and
/// ends the log. A complete frame failing its checksum or decoding is an
/// error.
pub(crate) fn decode_frames(bytes: &[u8], mut offset: usize) -> CodecResult<DecodedFrames> {
    let mut batches = Vec::new();
    while offset < bytes.len() {
        if bytes.len() - offset < FRAME_HEADER_LEN {
            break;
        }
        let length = read_u32(bytes, offset) as usize;
        let checksum = read_u32(bytes, offset + 4);
        let start = offset + FRAME_HEADER_LEN;
        let end = match start.checked_add(length).filter(|end| *end <= bytes.len()) {
            Some(end) => end,
            None => break,
        };

        let payload = &bytes[start..end];
        if crc32fast::hash(payload) != checksum {
            return Err(FileCodecError::ChecksumMismatch { offset });
        }

        let (batch, _) = bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(|e| FileCodecError::Decode {
                offset,
                message: e.to_string(),
            })?;
        batches.push(batch);
        offset = end;
    }
    Ok(DecodedFrames {
        batches,
        valid_len: offset,
    })
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}
