//! The optimization mask and its per-sector refinement.
//!
//! Each bit of the mask grants the encoder permission to drop one
//! reconstructible region. Which bits are actually safe depends on the
//! sector at hand, so the stream driver proposes a mask and folds the
//! refinement of every sector into it. Refinement only ever clears
//! bits; the surviving mask is the intersection that breaks no sector.

use bitflags::bitflags;

use crate::lib_structs::{MsfTime, SectorType, SECTOR_SIZE};

bitflags! {
    /// Regions the encoder is allowed to strip when the sector permits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Optimizations: u8 {
        /// Drop the 12-byte sync pattern.
        const REMOVE_SYNC = 1;
        /// Drop the 3-byte MSF address.
        const REMOVE_MSF = 1 << 1;
        /// Drop the mode byte.
        const REMOVE_MODE = 1 << 2;
        /// Drop the 8-byte reserved field of mode 1 sectors.
        const REMOVE_BLANKS = 1 << 3;
        /// Drop the duplicated half of the XA subheader.
        const REMOVE_REDUNDANT_FLAG = 1 << 4;
        /// Drop the Reed-Solomon parity.
        const REMOVE_ECC = 1 << 5;
        /// Drop the error detection checksum.
        const REMOVE_EDC = 1 << 6;
        /// Drop the payload of gap sectors.
        const REMOVE_GAP = 1 << 7;
    }
}

/// Narrows a proposed mask to what one sector tolerates losslessly.
///
/// Bits are only ever cleared, never added. Audio and unknown sectors
/// pass the mask through untouched: their encoders ignore every bit
/// except `REMOVE_GAP`, which is always safe for them.
pub fn refine_optimizations(
    sector: &[u8; SECTOR_SIZE],
    sector_number: u32,
    options: Optimizations,
    sector_type: SectorType,
) -> Optimizations {
    if !sector_type.is_data() {
        return options;
    }

    let mut refined = options;

    if refined.contains(Optimizations::REMOVE_MSF) {
        // The address can only be dropped when it matches the one the
        // decoder will regenerate from the sector number.
        let generated = MsfTime::from_sector_number(sector_number).to_bcd();
        if sector[0x00C..0x00F] != generated {
            refined.remove(Optimizations::REMOVE_MSF);
        }
    }

    if refined.contains(Optimizations::REMOVE_REDUNDANT_FLAG)
        && matches!(
            sector_type,
            SectorType::Mode2XaGap
                | SectorType::Mode2Xa1
                | SectorType::Mode2Xa1Gap
                | SectorType::Mode2Xa2
                | SectorType::Mode2Xa2Gap
        )
        && sector[0x010..0x014] != sector[0x014..0x018]
    {
        refined.remove(Optimizations::REMOVE_REDUNDANT_FLAG);
    }

    refined
}
