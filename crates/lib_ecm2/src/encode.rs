//! Per-variant sector encoders and the encoded size oracle.
//!
//! An encoder consumes one raw 2352-byte sector and appends only the
//! fields the decoder cannot regenerate under the active optimization
//! mask. [`encoded_sector_size`] is the matching pure function: for any
//! variant and mask it reports exactly how many bytes the encoder emits
//! and the decoder will consume.

use crate::buffer::DataBuffer;
use crate::lib_error_handling::Ecm2Error;
use crate::lib_structs::{SectorType, SECTOR_SIZE};
use crate::optimize::Optimizations;

/// Encodes one sector, appending its retained fields to `output`.
pub fn encode_sector(
    sector: &[u8; SECTOR_SIZE],
    sector_type: SectorType,
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    match sector_type {
        SectorType::Cdda | SectorType::CddaGap => {
            encode_cdda(sector, sector_type, options, output)
        }
        SectorType::Mode1 | SectorType::Mode1Gap | SectorType::Mode1Raw => {
            encode_mode_1(sector, sector_type, options, output)
        }
        SectorType::Mode2 | SectorType::Mode2Gap => {
            encode_mode_2(sector, sector_type, options, output)
        }
        SectorType::Mode2XaGap => {
            encode_mode_2_xa_gap(sector, options, output)
        }
        SectorType::Mode2Xa1 | SectorType::Mode2Xa1Gap => {
            encode_mode_2_xa_1(sector, sector_type, options, output)
        }
        SectorType::Mode2Xa2 | SectorType::Mode2Xa2Gap => {
            encode_mode_2_xa_2(sector, sector_type, options, output)
        }
        SectorType::ModeX => encode_mode_x(sector, options, output),
        SectorType::Unknown => Err(Ecm2Error::Internal(
            "cannot encode a sector of unknown type".to_string(),
        )),
    }
}

/// Sync pattern and MSF address shared by every data sector layout.
fn encode_sync_and_msf(
    sector: &[u8; SECTOR_SIZE],
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    if !options.contains(Optimizations::REMOVE_SYNC) {
        output.write(&sector[0x000..0x00C])?;
    }
    if !options.contains(Optimizations::REMOVE_MSF) {
        output.write(&sector[0x00C..0x00F])?;
    }
    Ok(())
}

/// XA subheader, either both copies or just the first.
fn encode_subheader(
    sector: &[u8; SECTOR_SIZE],
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    if !options.contains(Optimizations::REMOVE_REDUNDANT_FLAG) {
        output.write(&sector[0x010..0x018])
    } else {
        output.write(&sector[0x010..0x014])
    }
}

fn encode_cdda(
    sector: &[u8; SECTOR_SIZE],
    sector_type: SectorType,
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    // Audio carries no reconstructible structure. Only a fully zeroed
    // gap can be dropped.
    if sector_type == SectorType::Cdda
        || !options.contains(Optimizations::REMOVE_GAP)
    {
        output.write(sector)?;
    }
    Ok(())
}

fn encode_mode_1(
    sector: &[u8; SECTOR_SIZE],
    sector_type: SectorType,
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    encode_sync_and_msf(sector, options, output)?;

    if !options.contains(Optimizations::REMOVE_MODE) {
        output.write(&sector[0x00F..0x010])?;
    }
    if sector_type != SectorType::Mode1Gap
        || !options.contains(Optimizations::REMOVE_GAP)
    {
        output.write(&sector[0x010..0x810])?;
    }
    // A raw sector failed its checksum once already; its EDC and parity
    // are payload and survive every mask.
    if !options.contains(Optimizations::REMOVE_EDC)
        || sector_type == SectorType::Mode1Raw
    {
        output.write(&sector[0x810..0x814])?;
    }
    if !options.contains(Optimizations::REMOVE_BLANKS) {
        output.write(&sector[0x814..0x81C])?;
    }
    if !options.contains(Optimizations::REMOVE_ECC)
        || sector_type == SectorType::Mode1Raw
    {
        output.write(&sector[0x81C..0x930])?;
    }
    Ok(())
}

fn encode_mode_2(
    sector: &[u8; SECTOR_SIZE],
    sector_type: SectorType,
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    encode_sync_and_msf(sector, options, output)?;

    if !options.contains(Optimizations::REMOVE_MODE) {
        output.write(&sector[0x00F..0x010])?;
    }
    if sector_type == SectorType::Mode2
        || !options.contains(Optimizations::REMOVE_GAP)
    {
        output.write(&sector[0x010..0x930])?;
    }
    Ok(())
}

fn encode_mode_2_xa_gap(
    sector: &[u8; SECTOR_SIZE],
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    encode_sync_and_msf(sector, options, output)?;

    if !options.contains(Optimizations::REMOVE_MODE) {
        output.write(&sector[0x00F..0x010])?;
    }
    encode_subheader(sector, options, output)?;
    if !options.contains(Optimizations::REMOVE_GAP) {
        output.write(&sector[0x018..0x930])?;
    }
    Ok(())
}

fn encode_mode_2_xa_1(
    sector: &[u8; SECTOR_SIZE],
    sector_type: SectorType,
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    encode_sync_and_msf(sector, options, output)?;

    if !options.contains(Optimizations::REMOVE_MODE) {
        output.write(&sector[0x00F..0x010])?;
    }
    encode_subheader(sector, options, output)?;
    if sector_type == SectorType::Mode2Xa1
        || !options.contains(Optimizations::REMOVE_GAP)
    {
        output.write(&sector[0x018..0x818])?;
    }
    if !options.contains(Optimizations::REMOVE_EDC) {
        output.write(&sector[0x818..0x81C])?;
    }
    if !options.contains(Optimizations::REMOVE_ECC) {
        output.write(&sector[0x81C..0x930])?;
    }
    Ok(())
}

fn encode_mode_2_xa_2(
    sector: &[u8; SECTOR_SIZE],
    sector_type: SectorType,
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    encode_sync_and_msf(sector, options, output)?;

    if !options.contains(Optimizations::REMOVE_MODE) {
        output.write(&sector[0x00F..0x010])?;
    }
    encode_subheader(sector, options, output)?;
    if sector_type == SectorType::Mode2Xa2
        || !options.contains(Optimizations::REMOVE_GAP)
    {
        output.write(&sector[0x018..0x92C])?;
    }
    if !options.contains(Optimizations::REMOVE_EDC) {
        output.write(&sector[0x92C..0x930])?;
    }
    Ok(())
}

fn encode_mode_x(
    sector: &[u8; SECTOR_SIZE],
    options: Optimizations,
    output: &mut DataBuffer<u8>,
) -> Result<(), Ecm2Error> {
    encode_sync_and_msf(sector, options, output)?;

    // The mode byte is unrecognized, so everything from it onward is
    // opaque and copied verbatim.
    output.write(&sector[0x00F..0x930])?;
    Ok(())
}

/// Number of bytes [`encode_sector`] emits for a variant under a mask.
pub fn encoded_sector_size(
    sector_type: SectorType,
    options: Optimizations,
) -> usize {
    let mut size = 0;

    if sector_type.is_data() {
        if !options.contains(Optimizations::REMOVE_SYNC) {
            size += 0x00C;
        }
        if !options.contains(Optimizations::REMOVE_MSF) {
            size += 0x003;
        }
    }

    match sector_type {
        SectorType::Unknown => {}
        SectorType::Cdda => size = SECTOR_SIZE,
        SectorType::CddaGap => {
            if !options.contains(Optimizations::REMOVE_GAP) {
                size = SECTOR_SIZE;
            }
        }
        SectorType::Mode1 | SectorType::Mode1Gap | SectorType::Mode1Raw => {
            if !options.contains(Optimizations::REMOVE_MODE) {
                size += 0x001;
            }
            if sector_type != SectorType::Mode1Gap
                || !options.contains(Optimizations::REMOVE_GAP)
            {
                size += 0x800;
            }
            if !options.contains(Optimizations::REMOVE_EDC)
                || sector_type == SectorType::Mode1Raw
            {
                size += 0x004;
            }
            if !options.contains(Optimizations::REMOVE_BLANKS) {
                size += 0x008;
            }
            if !options.contains(Optimizations::REMOVE_ECC)
                || sector_type == SectorType::Mode1Raw
            {
                size += 0x114;
            }
        }
        SectorType::Mode2 | SectorType::Mode2Gap => {
            if !options.contains(Optimizations::REMOVE_MODE) {
                size += 0x001;
            }
            if sector_type == SectorType::Mode2
                || !options.contains(Optimizations::REMOVE_GAP)
            {
                size += 0x920;
            }
        }
        SectorType::Mode2XaGap => {
            if !options.contains(Optimizations::REMOVE_MODE) {
                size += 0x001;
            }
            size += subheader_size(options);
            if !options.contains(Optimizations::REMOVE_GAP) {
                size += 0x918;
            }
        }
        SectorType::Mode2Xa1 | SectorType::Mode2Xa1Gap => {
            if !options.contains(Optimizations::REMOVE_MODE) {
                size += 0x001;
            }
            size += subheader_size(options);
            if sector_type == SectorType::Mode2Xa1
                || !options.contains(Optimizations::REMOVE_GAP)
            {
                size += 0x800;
            }
            if !options.contains(Optimizations::REMOVE_EDC) {
                size += 0x004;
            }
            if !options.contains(Optimizations::REMOVE_ECC) {
                size += 0x114;
            }
        }
        SectorType::Mode2Xa2 | SectorType::Mode2Xa2Gap => {
            if !options.contains(Optimizations::REMOVE_MODE) {
                size += 0x001;
            }
            size += subheader_size(options);
            if sector_type == SectorType::Mode2Xa2
                || !options.contains(Optimizations::REMOVE_GAP)
            {
                size += 0x914;
            }
            if !options.contains(Optimizations::REMOVE_EDC) {
                size += 0x004;
            }
        }
        SectorType::ModeX => size += 0x921,
    }

    size
}

fn subheader_size(options: Optimizations) -> usize {
    if options.contains(Optimizations::REMOVE_REDUNDANT_FLAG) {
        0x004
    } else {
        0x008
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [SectorType; 14] = [
        SectorType::Unknown,
        SectorType::Cdda,
        SectorType::CddaGap,
        SectorType::Mode1,
        SectorType::Mode1Gap,
        SectorType::Mode1Raw,
        SectorType::Mode2,
        SectorType::Mode2Gap,
        SectorType::Mode2XaGap,
        SectorType::Mode2Xa1,
        SectorType::Mode2Xa1Gap,
        SectorType::Mode2Xa2,
        SectorType::Mode2Xa2Gap,
        SectorType::ModeX,
    ];

    #[test]
    fn size_oracle_matches_the_bytes_written() {
        let mut sector = [0u8; SECTOR_SIZE];
        for (i, byte) in sector.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(19).wrapping_add(11);
        }

        for sector_type in ALL_TYPES {
            if sector_type == SectorType::Unknown {
                continue;
            }
            for bits in 0..=255u8 {
                let options = Optimizations::from_bits_retain(bits);
                let mut output = DataBuffer::new(SECTOR_SIZE);
                encode_sector(&sector, sector_type, options, &mut output)
                    .unwrap();
                assert_eq!(
                    output.position(),
                    encoded_sector_size(sector_type, options),
                    "size mismatch for {:?} with mask {:#04x}",
                    sector_type,
                    bits,
                );
            }
        }
    }

    #[test]
    fn unknown_sectors_are_rejected() {
        let sector = [0u8; SECTOR_SIZE];
        let mut output = DataBuffer::new(SECTOR_SIZE);
        let result = encode_sector(
            &sector,
            SectorType::Unknown,
            Optimizations::all(),
            &mut output,
        );
        assert!(matches!(result, Err(Ecm2Error::Internal(_))));
    }

    #[test]
    fn full_mask_reduces_a_mode_1_gap_to_nothing() {
        let sector = [0u8; SECTOR_SIZE];
        let mut output = DataBuffer::new(SECTOR_SIZE);
        encode_sector(
            &sector,
            SectorType::Mode1Gap,
            Optimizations::all(),
            &mut output,
        )
        .unwrap();
        assert_eq!(output.position(), 0);
        assert_eq!(
            encoded_sector_size(SectorType::Mode1Gap, Optimizations::all()),
            0
        );
    }

    #[test]
    fn audio_is_always_kept_whole() {
        let mut sector = [0u8; SECTOR_SIZE];
        sector[0] = 1;
        let mut output = DataBuffer::new(SECTOR_SIZE);
        encode_sector(
            &sector,
            SectorType::Cdda,
            Optimizations::all(),
            &mut output,
        )
        .unwrap();
        assert_eq!(output.position(), SECTOR_SIZE);
    }

    #[test]
    fn xa_gap_under_the_full_mask_keeps_mode_and_half_subheader() {
        assert_eq!(
            encoded_sector_size(SectorType::Mode2XaGap, Optimizations::all()),
            4
        );

        let kept = Optimizations::all() - Optimizations::REMOVE_MODE;
        assert_eq!(encoded_sector_size(SectorType::Mode2XaGap, kept), 5);
    }
}
