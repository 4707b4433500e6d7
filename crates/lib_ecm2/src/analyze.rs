//! Structural classification of raw sectors.
//!
//! A 2352-byte window is inspected for the sync pattern, its mode byte
//! and the validity of its checksum and parity, and sorted into one of
//! the [`SectorType`] variants. The encoder trusts this classification
//! to decide which fields the decoder will be able to regenerate, so
//! every check here is conservative: a sector that fails validation is
//! demoted to a variant that preserves more of its bytes.

use crate::ecc::{edc_checksum, EccCodec};
use crate::lib_structs::{SectorType, SECTOR_SIZE, SYNC_PATTERN};

const ZERO_ADDRESS: [u8; 4] = [0; 4];

pub(crate) fn is_all_zeros(data: &[u8]) -> bool {
    data.iter().all(|&byte| byte == 0)
}

fn stored_edc(bytes: &[u8]) -> u32 {
    // The caller always hands a 4-byte slice.
    let mut edc = [0u8; 4];
    edc.copy_from_slice(bytes);
    u32::from_le_bytes(edc)
}

/// Classifies one raw 2352-byte sector.
///
/// Data sectors are recognized by their sync pattern and then narrowed
/// down by mode byte, checksum and parity. Anything without the sync
/// pattern is audio. Earlier checks win: a fully zeroed mode 2 payload
/// is reported as `Mode2Gap` even though it would also pass the XA
/// form 1 gap check.
pub fn detect_sector(ecc: &EccCodec, sector: &[u8; SECTOR_SIZE]) -> SectorType {
    if sector[0x000..0x00C] != SYNC_PATTERN {
        // No sync pattern, so the sector is audio.
        return if is_all_zeros(sector) {
            SectorType::CddaGap
        } else {
            SectorType::Cdda
        };
    }

    if sector[0x00F] == 0x01 && is_all_zeros(&sector[0x814..0x81C]) {
        // Mode 1 shaped. Confirm with the parity and the checksum over
        // the sync, header and user data.
        let address: [u8; 4] = [
            sector[0x00C], sector[0x00D], sector[0x00E], sector[0x00F],
        ];
        if ecc.check_sector(&address, &sector[0x010..0x930])
            && edc_checksum(&sector[0x000..0x810])
                == stored_edc(&sector[0x810..0x814])
        {
            if is_all_zeros(&sector[0x010..0x810]) {
                return SectorType::Mode1Gap;
            }
            return SectorType::Mode1;
        }

        // The checksum does not verify, so the sector is damaged or a
        // protection scheme. Keep it opaque.
        return SectorType::Mode1Raw;
    }

    if sector[0x00F] == 0x02 {
        // Mode 2, possibly XA form 1 or form 2. An entirely zeroed
        // payload must win before the XA checks see it.
        if is_all_zeros(&sector[0x010..0x930]) {
            return SectorType::Mode2Gap;
        }

        if ecc.check_sector(&ZERO_ADDRESS, &sector[0x010..0x930])
            && edc_checksum(&sector[0x010..0x818])
                == stored_edc(&sector[0x818..0x81C])
        {
            if is_all_zeros(&sector[0x018..0x818]) {
                return SectorType::Mode2Xa1Gap;
            }
            return SectorType::Mode2Xa1;
        }

        if edc_checksum(&sector[0x010..0x92C])
            == stored_edc(&sector[0x92C..0x930])
        {
            if is_all_zeros(&sector[0x018..0x92C]) {
                return SectorType::Mode2Xa2Gap;
            }
            return SectorType::Mode2Xa2;
        }

        // Some discs carry XA sectors whose payload is zeroed out
        // together with the checksum and parity. The duplicated
        // subheader is the only structure left to recognize them by.
        if sector[0x010..0x014] == sector[0x014..0x018]
            && is_all_zeros(&sector[0x018..0x930])
        {
            return SectorType::Mode2XaGap;
        }

        return SectorType::Mode2;
    }

    // Sync pattern present but the mode byte is neither 1 nor 2.
    SectorType::ModeX
}
