use std::io::{Read, Write};

use weft_types::HistoryMode;

use crate::error::{SnapshotError, SnapshotResult};
use crate::records::{mode_byte, mode_from_byte, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};

/// Per-record framing: `[tag u8][len u32 LE][crc u32 LE][zstd payload]`.
/// The CRC covers the compressed payload. Everything written before the
/// trailing checksum is fed to a running BLAKE3 hasher; the checksum itself
/// is not.
pub(crate) struct RecordWriter<W: Write> {
    inner: W,
    hasher: blake3::Hasher,
    offset: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
            offset: 0,
        }
    }

    /// Write the stream header: magic, version, history mode.
    pub fn write_header(&mut self, mode: HistoryMode) -> SnapshotResult<()> {
        self.put(SNAPSHOT_MAGIC)?;
        self.put(&SNAPSHOT_VERSION.to_be_bytes())?;
        self.put(&[mode_byte(mode)])?;
        Ok(())
    }

    /// Frame and write one record.
    pub fn write_record(&mut self, tag: u8, payload: &[u8]) -> SnapshotResult<()> {
        let compressed = zstd::encode_all(payload, 3)?;
        let crc = crc32fast::hash(&compressed);
        self.put(&[tag])?;
        self.put(&(compressed.len() as u32).to_le_bytes())?;
        self.put(&crc.to_le_bytes())?;
        self.put(&compressed)?;
        Ok(())
    }

    /// Write the end marker and the trailing whole-stream checksum.
    pub fn finish(mut self, end_tag: u8) -> SnapshotResult<(W, u64)> {
        self.write_record(end_tag, &[])?;
        let checksum = self.hasher.finalize();
        self.inner.write_all(checksum.as_bytes())?;
        self.inner.flush()?;
        Ok((self.inner, self.offset + 32))
    }

    fn put(&mut self, bytes: &[u8]) -> SnapshotResult<()> {
        self.inner.write_all(bytes)?;
        self.hasher.update(bytes);
        self.offset += bytes.len() as u64;
        Ok(())
    }
}

/// A decoded-but-unparsed record.
#[derive(Debug)]
pub(crate) struct RawRecord {
    pub tag: u8,
    pub payload: Vec<u8>,
    /// Offset of the record's tag byte, for error reporting.
    pub offset: u64,
}

/// Streaming reader mirroring [`RecordWriter`].
pub(crate) struct RecordReader<R: Read> {
    inner: R,
    hasher: blake3::Hasher,
    offset: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
            offset: 0,
        }
    }

    /// Read and validate the stream header, returning the history mode.
    pub fn read_header(&mut self) -> SnapshotResult<HistoryMode> {
        let mut magic = [0u8; 8];
        self.take(&mut magic, "magic")?;
        if &magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic {
                expected: String::from_utf8_lossy(SNAPSHOT_MAGIC).into_owned(),
                actual: String::from_utf8_lossy(&magic).into_owned(),
            });
        }
        let mut version = [0u8; 4];
        self.take(&mut version, "version")?;
        let version = u32::from_be_bytes(version);
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }
        let mut mode = [0u8; 1];
        self.take(&mut mode, "history mode")?;
        mode_from_byte(mode[0]).ok_or(SnapshotError::Corrupt {
            offset: self.offset - 1,
            reason: format!("unknown history mode byte: {}", mode[0]),
        })
    }

    /// Read the next framed record, checking its CRC and decompressing.
    pub fn next_record(&mut self) -> SnapshotResult<RawRecord> {
        let record_offset = self.offset;

        let mut tag = [0u8; 1];
        self.take(&mut tag, "record tag")?;
        let mut len = [0u8; 4];
        self.take(&mut len, "record length")?;
        let len = u32::from_le_bytes(len) as usize;
        let mut crc = [0u8; 4];
        self.take(&mut crc, "record CRC")?;
        let expected_crc = u32::from_le_bytes(crc);

        let mut compressed = vec![0u8; len];
        self.take(&mut compressed, "record payload")?;

        if crc32fast::hash(&compressed) != expected_crc {
            return Err(SnapshotError::CrcMismatch {
                offset: record_offset,
            });
        }

        let payload = zstd::decode_all(compressed.as_slice())?;
        Ok(RawRecord {
            tag: tag[0],
            payload,
            offset: record_offset,
        })
    }

    /// After the end marker: read the trailing checksum and compare it with
    /// the running hash of everything before it.
    pub fn verify_checksum(mut self) -> SnapshotResult<()> {
        let computed = self.hasher.finalize();
        let mut recorded = [0u8; 32];
        self.inner.read_exact(&mut recorded).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                SnapshotError::Corrupt {
                    offset: self.offset,
                    reason: "truncated stream checksum".into(),
                }
            } else {
                SnapshotError::Io(e)
            }
        })?;
        if recorded != *computed.as_bytes() {
            return Err(SnapshotError::ChecksumMismatch);
        }
        Ok(())
    }

    fn take(&mut self, buf: &mut [u8], what: &str) -> SnapshotResult<()> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                SnapshotError::Corrupt {
                    offset: self.offset,
                    reason: format!("truncated {what}"),
                }
            } else {
                SnapshotError::Io(e)
            }
        })?;
        self.hasher.update(buf);
        self.offset += buf.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{TAG_BLOCK, TAG_END};
    use weft_types::HistoryMode;

    fn write_stream(records: &[(u8, &[u8])]) -> Vec<u8> {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_header(HistoryMode::Archive).unwrap();
        for (tag, payload) in records {
            writer.write_record(*tag, payload).unwrap();
        }
        let (bytes, _) = writer.finish(TAG_END).unwrap();
        bytes
    }

    #[test]
    fn roundtrip_with_checksum() {
        let bytes = write_stream(&[(TAG_BLOCK, b"hello"), (TAG_BLOCK, b"world")]);
        let mut reader = RecordReader::new(bytes.as_slice());
        assert_eq!(reader.read_header().unwrap(), HistoryMode::Archive);

        let r1 = reader.next_record().unwrap();
        assert_eq!((r1.tag, r1.payload.as_slice()), (TAG_BLOCK, b"hello".as_slice()));
        let r2 = reader.next_record().unwrap();
        assert_eq!(r2.payload, b"world");
        let end = reader.next_record().unwrap();
        assert_eq!(end.tag, TAG_END);

        reader.verify_checksum().unwrap();
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = write_stream(&[]);
        bytes[0] = b'X';
        let mut reader = RecordReader::new(bytes.as_slice());
        assert!(matches!(
            reader.read_header(),
            Err(SnapshotError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut bytes = write_stream(&[]);
        bytes[8..12].copy_from_slice(&99u32.to_be_bytes());
        let mut reader = RecordReader::new(bytes.as_slice());
        assert!(matches!(
            reader.read_header(),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn corrupted_payload_fails_crc() {
        let mut bytes = write_stream(&[(TAG_BLOCK, b"payload to corrupt")]);
        // Flip a byte inside the first record's compressed payload
        // (header is 13 bytes, record header is 9).
        bytes[13 + 9 + 2] ^= 0xFF;
        let mut reader = RecordReader::new(bytes.as_slice());
        reader.read_header().unwrap();
        assert!(matches!(
            reader.next_record(),
            Err(SnapshotError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn truncated_stream_is_corrupt() {
        let bytes = write_stream(&[(TAG_BLOCK, b"data")]);
        let truncated = &bytes[..bytes.len() - 40];
        let mut reader = RecordReader::new(truncated);
        reader.read_header().unwrap();
        reader.next_record().unwrap();
        // The end record is cut off.
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt { .. }));
    }

    #[test]
    fn tampered_checksum_is_detected() {
        let mut bytes = write_stream(&[(TAG_BLOCK, b"data")]);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let mut reader = RecordReader::new(bytes.as_slice());
        reader.read_header().unwrap();
        reader.next_record().unwrap();
        let end = reader.next_record().unwrap();
        assert_eq!(end.tag, TAG_END);
        assert!(matches!(
            reader.verify_checksum(),
            Err(SnapshotError::ChecksumMismatch)
        ));
    }
}
