//! Builders for well-formed raw sectors, shared by the unit tests.

use crate::ecc::{edc_checksum, EccCodec};
use crate::lib_structs::{MsfTime, SECTOR_SIZE, SYNC_PATTERN};

pub(crate) fn data_header(
    sector: &mut [u8; SECTOR_SIZE],
    sector_number: u32,
    mode: u8,
) {
    sector[0x000..0x00C].copy_from_slice(&SYNC_PATTERN);
    sector[0x00C..0x00F]
        .copy_from_slice(&MsfTime::from_sector_number(sector_number).to_bcd());
    sector[0x00F] = mode;
}

/// Audio sector with a pattern that cannot match the sync prefix.
pub(crate) fn build_cdda(seed: u8) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    for (i, byte) in sector.iter_mut().enumerate() {
        *byte = (i as u8)
            .wrapping_mul(17)
            .wrapping_add(seed)
            .wrapping_add(3);
    }
    sector[0] = 0x7F;
    sector
}

pub(crate) fn build_cdda_gap() -> [u8; SECTOR_SIZE] {
    [0u8; SECTOR_SIZE]
}

pub(crate) fn build_mode_1(
    sector_number: u32,
    fill: impl Fn(usize) -> u8,
) -> [u8; SECTOR_SIZE] {
    let ecc = EccCodec::new();
    let mut sector = [0u8; SECTOR_SIZE];
    data_header(&mut sector, sector_number, 0x01);
    for i in 0x010..0x810 {
        sector[i] = fill(i);
    }
    let edc = edc_checksum(&sector[0x000..0x810]);
    sector[0x810..0x814].copy_from_slice(&edc.to_le_bytes());
    let address: [u8; 4] = [
        sector[0x00C], sector[0x00D], sector[0x00E], sector[0x00F],
    ];
    ecc.write_sector(&address, &mut sector[0x010..0x930]);
    sector
}

/// Mode 1 shape whose checksum deliberately does not verify.
pub(crate) fn build_mode_1_raw(sector_number: u32) -> [u8; SECTOR_SIZE] {
    let mut sector = build_mode_1(sector_number, |i| (i as u8).wrapping_mul(9));
    sector[0x810] ^= 0xFF;
    sector
}

pub(crate) fn build_mode_2(sector_number: u32) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    data_header(&mut sector, sector_number, 0x02);
    for i in 0x010..0x930 {
        sector[i] = (i as u8).wrapping_mul(11).wrapping_add(1);
    }
    sector
}

pub(crate) fn build_mode_2_gap(sector_number: u32) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    data_header(&mut sector, sector_number, 0x02);
    sector
}

pub(crate) fn build_mode_2_xa_gap(
    sector_number: u32,
    flags: [u8; 4],
) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    data_header(&mut sector, sector_number, 0x02);
    sector[0x010..0x014].copy_from_slice(&flags);
    sector[0x014..0x018].copy_from_slice(&flags);
    sector
}

pub(crate) fn build_mode_2_xa_1(
    sector_number: u32,
    fill: impl Fn(usize) -> u8,
) -> [u8; SECTOR_SIZE] {
    let ecc = EccCodec::new();
    let mut sector = [0u8; SECTOR_SIZE];
    data_header(&mut sector, sector_number, 0x02);
    sector[0x010..0x014].copy_from_slice(&[0x00, 0x00, 0x08, 0x00]);
    sector[0x014..0x018].copy_from_slice(&[0x00, 0x00, 0x08, 0x00]);
    for i in 0x018..0x818 {
        sector[i] = fill(i);
    }
    let edc = edc_checksum(&sector[0x010..0x818]);
    sector[0x818..0x81C].copy_from_slice(&edc.to_le_bytes());
    ecc.write_sector(&[0; 4], &mut sector[0x010..0x930]);
    sector
}

pub(crate) fn build_mode_2_xa_2(
    sector_number: u32,
    fill: impl Fn(usize) -> u8,
) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    data_header(&mut sector, sector_number, 0x02);
    sector[0x010..0x014].copy_from_slice(&[0x00, 0x00, 0x28, 0x00]);
    sector[0x014..0x018].copy_from_slice(&[0x00, 0x00, 0x28, 0x00]);
    for i in 0x018..0x92C {
        sector[i] = fill(i);
    }
    let edc = edc_checksum(&sector[0x010..0x92C]);
    sector[0x92C..0x930].copy_from_slice(&edc.to_le_bytes());
    sector
}

/// Data sector with an unrecognized mode byte.
pub(crate) fn build_mode_x(sector_number: u32) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    data_header(&mut sector, sector_number, 0x05);
    for i in 0x010..0x930 {
        sector[i] = (i as u8).wrapping_mul(13).wrapping_add(7);
    }
    sector
}
