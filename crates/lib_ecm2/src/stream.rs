//! Stream-level coordination of the sector codec.
//!
//! [`Ecm2Processor`] owns the parity tables and drives whole batches of
//! sectors through detection, refinement, encoding and decoding. The
//! encode path is deliberately two-phase: every sector of the batch is
//! analyzed before a single byte is emitted, so the mask used to size
//! the output is the same mask used to write it. Callers stream large
//! images by invoking the batch operations repeatedly over reused
//! buffers.

use tracing::debug;

use crate::analyze::detect_sector;
use crate::buffer::DataBuffer;
use crate::ecc::EccCodec;
use crate::encode::{encode_sector, encoded_sector_size};
use crate::lib_error_handling::Ecm2Error;
use crate::lib_structs::{SectorType, SECTOR_SIZE};
use crate::optimize::{refine_optimizations, Optimizations};
use crate::reconstruction::decode_sector;

/// Sector codec with its lookup tables ready.
///
/// Construction fills the parity tables; afterwards the processor is
/// immutable and can be shared across threads. Two processors working
/// on two streams are fully independent.
pub struct Ecm2Processor {
    ecc: EccCodec,
}

impl Ecm2Processor {
    pub fn new() -> Self {
        Ecm2Processor {
            ecc: EccCodec::new(),
        }
    }

    /// Classifies one raw sector window.
    pub fn detect(&self, sector: &[u8; SECTOR_SIZE]) -> SectorType {
        detect_sector(&self.ecc, sector)
    }

    /// Encodes one sector, appending its retained fields to `output`.
    pub fn encode_sector(
        &self,
        sector: &[u8; SECTOR_SIZE],
        sector_type: SectorType,
        options: Optimizations,
        output: &mut DataBuffer<u8>,
    ) -> Result<(), Ecm2Error> {
        encode_sector(sector, sector_type, options, output)
    }

    /// Rebuilds one sector from `input` into `out`.
    pub fn decode_sector(
        &self,
        input: &mut DataBuffer<u8>,
        out: &mut [u8; SECTOR_SIZE],
        sector_type: SectorType,
        sector_number: u32,
        options: Optimizations,
    ) -> Result<(), Ecm2Error> {
        decode_sector(&self.ecc, input, out, sector_type, sector_number, options)
    }

    /// Encodes a batch of raw sectors.
    ///
    /// The batch is analyzed first: each sector is classified into
    /// `index` and, when `use_best_optimizations` is set, the proposed
    /// mask in `options` is narrowed to what the sector tolerates.
    /// Only then is the input rewound and emitted under the final mask.
    ///
    /// # Arguments
    ///
    /// * `input`: Raw sectors, at least `input_sectors * 2352` bytes
    ///   available.
    /// * `output`: Receives the concatenated encoded sectors.
    /// * `index`: Receives one classification entry per sector.
    /// * `start_sector`: Absolute number of the first sector in the
    ///   batch, needed to judge whether stored MSF addresses are
    ///   regenerable.
    /// * `options`: Proposed optimization mask; narrowed in place when
    ///   `use_best_optimizations` is set.
    pub fn encode_stream(
        &self,
        input: &mut DataBuffer<u8>,
        output: &mut DataBuffer<u8>,
        index: &mut DataBuffer<SectorType>,
        input_sectors: u32,
        start_sector: u32,
        options: &mut Optimizations,
        use_best_optimizations: bool,
    ) -> Result<(), Ecm2Error> {
        let sectors = input_sectors as usize;

        if input.available() < sectors * SECTOR_SIZE {
            return Err(Ecm2Error::NotEnoughInputData);
        }
        if index.available() < sectors {
            return Err(Ecm2Error::NotEnoughIndexSpace);
        }

        input.checkpoint();
        index.checkpoint();

        for i in 0..sectors {
            let window: &[u8; SECTOR_SIZE] =
                input.consume(SECTOR_SIZE)?.try_into()?;
            let sector_type = detect_sector(&self.ecc, window);

            if use_best_optimizations {
                let refined = refine_optimizations(
                    window,
                    start_sector + i as u32,
                    *options,
                    sector_type,
                );
                if refined != *options {
                    debug!(
                        sector = start_sector + i as u32,
                        "optimization mask narrowed from {:#04x} to {:#04x}",
                        options.bits(),
                        refined.bits(),
                    );
                    *options = refined;
                }
            }

            index.write(&[sector_type])?;
        }

        // Size the emission with the mask that survived analysis.
        index.rewind_to_checkpoint();
        let types = index.consume(sectors)?;
        let total: usize = types
            .iter()
            .map(|sector_type| encoded_sector_size(*sector_type, *options))
            .sum();
        if output.available() < total {
            return Err(Ecm2Error::NotEnoughOutputSpace);
        }

        input.rewind_to_checkpoint();
        for sector_type in types {
            let window: &[u8; SECTOR_SIZE] =
                input.consume(SECTOR_SIZE)?.try_into()?;
            encode_sector(window, *sector_type, *options, output)?;
        }

        Ok(())
    }

    /// Decodes a batch of encoded sectors.
    ///
    /// Consumes one index entry and `encoded_sector_size` bytes per
    /// sector and emits `input_sectors * 2352` bytes. The sizes are
    /// verified against both buffers before any sector is rebuilt.
    pub fn decode_stream(
        &self,
        input: &mut DataBuffer<u8>,
        output: &mut DataBuffer<u8>,
        index: &mut DataBuffer<SectorType>,
        input_sectors: u32,
        start_sector: u32,
        options: Optimizations,
    ) -> Result<(), Ecm2Error> {
        let sectors = input_sectors as usize;

        if sectors == 0 || index.available() < sectors {
            return Err(Ecm2Error::WrongIndexData);
        }

        let types = index.consume(sectors)?;
        let total: usize = types
            .iter()
            .map(|sector_type| encoded_sector_size(*sector_type, options))
            .sum();
        if input.available() < total {
            return Err(Ecm2Error::NotEnoughInputData);
        }
        if output.available() < sectors * SECTOR_SIZE {
            return Err(Ecm2Error::NotEnoughOutputSpace);
        }

        for (i, sector_type) in types.iter().enumerate() {
            let slot: &mut [u8; SECTOR_SIZE] =
                output.consume_mut(SECTOR_SIZE)?.try_into()?;
            decode_sector(
                &self.ecc,
                input,
                slot,
                *sector_type,
                start_sector + i as u32,
                options,
            )?;
        }

        Ok(())
    }
}

impl Default for Ecm2Processor {
    fn default() -> Self {
        Ecm2Processor::new()
    }
}
