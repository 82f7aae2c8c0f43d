//! File-container framing: a small file header followed by one or more
//! independently-compressed chunks. This is plumbing around the codec's
//! whole-buffer calls, not part of the codec itself — grounded directly
//! on the file-layout description rather than any one teacher file, the
//! way the teacher reads its own fixed-width little-endian header fields
//! (`read_u32_le`/`read_u16_le`) in `bitstream.rs`.

use thiserror::Error as ThisError;

use crate::compressor::Compressor;
use crate::decompressor::Decompressor;
use crate::error::Error as CodecError;

pub const MAGIC: [u8; 8] = *b"XPACK\0\0\0";
pub const FILE_HEADER_SIZE: usize = 16;
pub const CHUNK_HEADER_SIZE: usize = 8;
pub const FORMAT_VERSION: u8 = 1;

pub const MIN_CHUNK_SIZE: u32 = 1024;
pub const MAX_CHUNK_SIZE: u32 = 64 * 1024 * 1024;

/// Errors specific to the container layer; codec failures while unpacking
/// a chunk are wrapped via `#[from]`.
#[derive(Debug, ThisError)]
pub enum ContainerError {
    #[error("not an XPACK file (bad magic)")]
    BadMagic,

    #[error("invalid chunk size {0} (must be in {MIN_CHUNK_SIZE}..={MAX_CHUNK_SIZE})")]
    InvalidChunkSize(u32),

    #[error("corrupt chunk header: {0}")]
    CorruptChunkHeader(&'static str),

    #[error("truncated XPACK file")]
    Truncated,

    #[error(transparent)]
    Codec(#[from] CodecError),
}

type Result<T> = std::result::Result<T, ContainerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub chunk_size: u32,
    pub compression_level: u8,
}

impl FileHeader {
    pub fn new(chunk_size: u32, compression_level: u8) -> Result<Self> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            return Err(ContainerError::InvalidChunkSize(chunk_size));
        }
        Ok(FileHeader {
            chunk_size,
            compression_level,
        })
    }

    pub fn to_bytes(self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        buf[0..8].copy_from_slice(&MAGIC);
        buf[8..12].copy_from_slice(&self.chunk_size.to_le_bytes());
        buf[12..14].copy_from_slice(&(FILE_HEADER_SIZE as u16).to_le_bytes());
        buf[14] = FORMAT_VERSION;
        buf[15] = self.compression_level;
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(ContainerError::Truncated);
        }
        if bytes[0..8] != MAGIC {
            return Err(ContainerError::BadMagic);
        }
        let chunk_size = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        let version = bytes[14];
        if version != FORMAT_VERSION {
            return Err(ContainerError::Codec(CodecError::UnsupportedVersion(version)));
        }
        let compression_level = bytes[15];
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            return Err(ContainerError::InvalidChunkSize(chunk_size));
        }
        Ok(FileHeader {
            chunk_size,
            compression_level,
        })
    }
}

struct ChunkHeader {
    stored_size: u32,
    original_size: u32,
}

impl ChunkHeader {
    fn to_bytes(self) -> [u8; CHUNK_HEADER_SIZE] {
        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.stored_size.to_le_bytes());
        buf[4..8].copy_from_slice(&self.original_size.to_le_bytes());
        buf
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < CHUNK_HEADER_SIZE {
            return Err(ContainerError::Truncated);
        }
        let stored_size = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let original_size = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        if stored_size == 0 || stored_size > original_size {
            return Err(ContainerError::CorruptChunkHeader(
                "stored_size must be in 1..=original_size",
            ));
        }
        Ok(ChunkHeader {
            stored_size,
            original_size,
        })
    }
}

/// Compresses `input` into the XPACK file container format: a file header
/// followed by one chunk per `chunk_size`-sized slice of `input`.
pub fn pack(input: &[u8], chunk_size: u32, level: u8) -> Result<Vec<u8>> {
    let header = FileHeader::new(chunk_size, level)?;
    let mut compressor = Compressor::new(chunk_size as usize, level)?;
    let mut out = Vec::with_capacity(input.len() / 2 + FILE_HEADER_SIZE);
    out.extend_from_slice(&header.to_bytes());

    let mut staging = vec![0u8; chunk_size as usize];
    for chunk in input.chunks(chunk_size as usize) {
        let written = compressor.compress(chunk, &mut staging);
        let (stored_size, body): (u32, &[u8]) = if written == 0 || written >= chunk.len() {
            (chunk.len() as u32, chunk)
        } else {
            (written as u32, &staging[..written])
        };
        let chunk_header = ChunkHeader {
            stored_size,
            original_size: chunk.len() as u32,
        };
        out.extend_from_slice(&chunk_header.to_bytes());
        out.extend_from_slice(body);
    }
    Ok(out)
}

/// Decompresses an XPACK-container byte stream back into its original
/// bytes.
pub fn unpack(input: &[u8]) -> Result<Vec<u8>> {
    let header = FileHeader::from_bytes(input)?;
    let mut decompressor = Decompressor::new(header.chunk_size as usize);
    let mut out = Vec::new();
    let mut cursor = FILE_HEADER_SIZE;

    while cursor < input.len() {
        let chunk_header = ChunkHeader::from_bytes(&input[cursor..])?;
        cursor += CHUNK_HEADER_SIZE;
        let body_end = cursor
            .checked_add(chunk_header.stored_size as usize)
            .ok_or(ContainerError::Truncated)?;
        if body_end > input.len() {
            return Err(ContainerError::Truncated);
        }
        let body = &input[cursor..body_end];

        if chunk_header.stored_size == chunk_header.original_size {
            out.extend_from_slice(body);
        } else {
            let mut decoded = vec![0u8; chunk_header.original_size as usize];
            decompressor.decompress(body, &mut decoded, chunk_header.original_size as usize)?;
            out.extend_from_slice(&decoded);
        }
        cursor = body_end;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog.".repeat(500);
        let packed = pack(&data, 4096, 6).unwrap();
        let unpacked = unpack(&packed).unwrap();
        assert_eq!(unpacked, data);
    }

    #[test]
    fn pack_unpack_round_trips_incompressible_data() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i.wrapping_mul(2654435761) >> 24) as u8).collect();
        let packed = pack(&data, 1024, 3).unwrap();
        let unpacked = unpack(&packed).unwrap();
        assert_eq!(unpacked, data);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = vec![0u8; FILE_HEADER_SIZE];
        bytes[14] = FORMAT_VERSION;
        assert!(matches!(FileHeader::from_bytes(&bytes), Err(ContainerError::BadMagic)));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut header = FileHeader::new(4096, 5).unwrap().to_bytes();
        header[14] = 99;
        assert!(matches!(
            FileHeader::from_bytes(&header),
            Err(ContainerError::Codec(CodecError::UnsupportedVersion(99)))
        ));
    }

    #[test]
    fn rejects_chunk_size_out_of_range() {
        assert!(FileHeader::new(10, 5).is_err());
        assert!(FileHeader::new(u32::MAX, 5).is_err());
    }

    #[test]
    fn empty_input_round_trips() {
        let packed = pack(&[], 4096, 1).unwrap();
        let unpacked = unpack(&packed).unwrap();
        assert!(unpacked.is_empty());
    }
}
