//! Provides the file system and container layout operations.
//!
//! This module owns the on-disk envelope of an encoded image: the magic
//! number, the fixed little-endian configuration block and the packed
//! sector index that precede the sector payloads. It also carries the
//! small file helpers shared by the two operating modes, including the
//! cleanup of half-written output files after a failure.

use std::fs::{remove_file, File};
use std::io::{Read, Write};
use std::path::Path;

use tracing::warn;

use crate::error_handling::CliError;

/// The magic number used to identify an encoded ECM2 file.
///
/// The four letters are followed by the container revision byte, so a
/// future layout change bumps the last byte rather than the name.
pub const MAGIC_NUMBER: [u8; 5] = [b'E', b'C', b'M', b'2', 0x01];

/// Upper bound on stored index records.
///
/// An 800 MB disc holds roughly 356659 sectors, and there can never be
/// more records than sectors, so anything above this is a damaged or
/// hostile file and is rejected before allocating.
pub const MAX_INDEX_ENTRIES: u32 = 400_000;

/// The fixed configuration block persisted right after the magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Bit mask of the optimizations the encoder applied.
    pub optimizations: u8,
    /// Count width in bytes of the packed index records.
    pub index_pack_mode: u8,
    /// Number of packed index records that follow the block.
    pub index_entries: u32,
    /// Total sector count of the original image.
    pub sectors: u32,
}

impl StreamConfig {
    pub const ENCODED_LEN: usize = 10;

    /// Serializes the block, multi-byte fields little-endian.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut bytes = [0u8; Self::ENCODED_LEN];
        bytes[0] = self.optimizations;
        bytes[1] = self.index_pack_mode;
        bytes[2..6].copy_from_slice(&self.index_entries.to_le_bytes());
        bytes[6..10].copy_from_slice(&self.sectors.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; Self::ENCODED_LEN]) -> Self {
        let mut index_entries = [0u8; 4];
        index_entries.copy_from_slice(&bytes[2..6]);
        let mut sectors = [0u8; 4];
        sectors.copy_from_slice(&bytes[6..10]);

        StreamConfig {
            optimizations: bytes[0],
            index_pack_mode: bytes[1],
            index_entries: u32::from_le_bytes(index_entries),
            sectors: u32::from_le_bytes(sectors),
        }
    }
}

/// Writes the magic, the configuration block and the packed index.
pub fn write_container_header(
    writer: &mut impl Write,
    config: &StreamConfig,
    packed_index: &[u8],
) -> Result<(), CliError> {
    writer.write_all(&MAGIC_NUMBER)?;
    writer.write_all(&config.to_bytes())?;
    writer.write_all(packed_index)?;
    Ok(())
}

/// Reads and validates the magic and the configuration block.
pub fn read_container_header(
    reader: &mut impl Read,
) -> Result<StreamConfig, CliError> {
    let mut magic = [0u8; MAGIC_NUMBER.len()];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC_NUMBER {
        return Err(CliError::InvalidContainer(
            "The file header does not carry the expected magic number."
                .to_string(),
        ));
    }

    let mut config_bytes = [0u8; StreamConfig::ENCODED_LEN];
    reader.read_exact(&mut config_bytes)?;
    let config = StreamConfig::from_bytes(&config_bytes);

    if config.index_entries == 0 || config.index_entries > MAX_INDEX_ENTRIES {
        return Err(CliError::InvalidContainer(format!(
            "The index record count {} is outside the plausible range.",
            config.index_entries,
        )));
    }
    if !(1..=4).contains(&config.index_pack_mode) {
        return Err(CliError::InvalidContainer(format!(
            "The index pack mode {} is not supported.",
            config.index_pack_mode,
        )));
    }

    Ok(config)
}

/// Opens an input file and reports its size in bytes.
pub fn open_input(path: &Path) -> Result<(File, u64), CliError> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    Ok((file, len))
}

pub fn create_output(path: &Path) -> Result<File, CliError> {
    Ok(File::create(path)?)
}

/// Best-effort removal of an output file after a failed run.
pub fn discard_output(path: &Path) {
    if path.exists() {
        if let Err(e) = remove_file(path) {
            warn!(
                "Failed to remove the incomplete output file {}: {}. \
                Please remove it manually.",
                path.display(),
                e,
            );
        }
    }
}
