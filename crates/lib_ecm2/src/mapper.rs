//! Run-length packing of the per-sector classification index.
//!
//! The index stores one [`SectorType`] per source sector. Long discs
//! are dominated by runs of a single type, so the persisted form is a
//! sequence of `(type, count)` records. The count is stored
//! little-endian in a configurable number of bytes, the pack mode: a
//! narrow count byte keeps short runs small, a wide one keeps long runs
//! from splitting. The encoder simply tries several widths and persists
//! the smallest result.

use crate::lib_error_handling::Ecm2Error;
use crate::lib_structs::SectorType;

/// Largest run one record can hold for a given count width.
fn run_limit(count_width: u8) -> u64 {
    (1u64 << (8 * count_width as u32)) - 1
}

fn check_count_width(count_width: u8) -> Result<(), Ecm2Error> {
    if (1..=4).contains(&count_width) {
        Ok(())
    } else {
        Err(Ecm2Error::Internal(format!(
            "index pack mode {count_width} is outside the supported 1..=4",
        )))
    }
}

/// Packs a sector index into `(type, count)` records.
///
/// A run is flushed when the sector type changes, when its length
/// saturates the count field, and at the end of the index. An empty
/// index packs to an empty record list.
pub fn pack_index(
    index: &[SectorType],
    count_width: u8,
) -> Result<Vec<u8>, Ecm2Error> {
    check_count_width(count_width)?;

    let limit = run_limit(count_width);
    let mut packed = Vec::new();

    let mut iter = index.iter();
    let Some(first) = iter.next() else {
        return Ok(packed);
    };

    let mut current_type = *first;
    let mut current_count: u64 = 1;

    let mut flush = |sector_type: SectorType, count: u64, out: &mut Vec<u8>| {
        out.push(sector_type.tag());
        out.extend_from_slice(&count.to_le_bytes()[..count_width as usize]);
    };

    for &sector_type in iter {
        if sector_type == current_type && current_count < limit {
            current_count += 1;
        } else {
            flush(current_type, current_count, &mut packed);
            current_type = sector_type;
            current_count = 1;
        }
    }
    flush(current_type, current_count, &mut packed);

    Ok(packed)
}

/// Expands packed records back into one entry per sector.
pub fn unpack_index(
    packed: &[u8],
    count_width: u8,
) -> Result<Vec<SectorType>, Ecm2Error> {
    check_count_width(count_width)?;

    let record_len = 1 + count_width as usize;
    if packed.len() % record_len != 0 {
        return Err(Ecm2Error::WrongIndexData);
    }

    let mut index = Vec::new();
    for record in packed.chunks_exact(record_len) {
        let sector_type = SectorType::from_tag(record[0])
            .ok_or(Ecm2Error::WrongIndexData)?;

        let mut count_bytes = [0u8; 8];
        count_bytes[..count_width as usize].copy_from_slice(&record[1..]);
        let count = u64::from_le_bytes(count_bytes);

        index.resize(index.len() + count as usize, sector_type);
    }

    Ok(index)
}

/// Count width in 1..=3 that yields the smallest packed index.
///
/// Ties keep the narrower width. Four-byte counts never pay off on
/// realistically sized discs, so they are accepted on unpack but not
/// chosen here.
pub fn best_count_width(index: &[SectorType]) -> Result<u8, Ecm2Error> {
    let mut best_width = 1;
    let mut best_len = usize::MAX;

    for count_width in 1..=3u8 {
        let packed_len = pack_index(index, count_width)?.len();
        if packed_len < best_len {
            best_width = count_width;
            best_len = packed_len;
        }
    }

    Ok(best_width)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_index() -> Vec<SectorType> {
        let mut index = Vec::new();
        index.extend(std::iter::repeat(SectorType::Mode1).take(300));
        index.extend(std::iter::repeat(SectorType::Cdda).take(2));
        index.extend(std::iter::repeat(SectorType::Mode2Xa1).take(70_000));
        index.push(SectorType::ModeX);
        index.extend(std::iter::repeat(SectorType::CddaGap).take(150));
        index
    }

    #[test]
    fn pack_unpack_is_the_identity_for_every_width() {
        let index = mixed_index();
        for count_width in 1..=4u8 {
            let packed = pack_index(&index, count_width).unwrap();
            let unpacked = unpack_index(&packed, count_width).unwrap();
            assert_eq!(unpacked, index, "width {count_width}");
        }
    }

    #[test]
    fn runs_split_when_the_count_saturates() {
        let index = vec![SectorType::Mode1; 600];
        let packed = pack_index(&index, 1).unwrap();
        // 600 = 255 + 255 + 90, three records of two bytes each.
        assert_eq!(packed.len(), 6);
        assert_eq!(unpack_index(&packed, 1).unwrap(), index);

        let packed_wide = pack_index(&index, 2).unwrap();
        assert_eq!(packed_wide.len(), 3);
    }

    #[test]
    fn empty_index_packs_to_nothing() {
        let packed = pack_index(&[], 2).unwrap();
        assert!(packed.is_empty());
        assert!(unpack_index(&packed, 2).unwrap().is_empty());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let packed = vec![0xEE, 0x01];
        assert!(matches!(
            unpack_index(&packed, 1),
            Err(Ecm2Error::WrongIndexData)
        ));
    }

    #[test]
    fn truncated_record_is_rejected() {
        let index = vec![SectorType::Mode1; 4];
        let mut packed = pack_index(&index, 2).unwrap();
        packed.pop();
        assert!(matches!(
            unpack_index(&packed, 2),
            Err(Ecm2Error::WrongIndexData)
        ));
    }

    #[test]
    fn width_outside_the_supported_range_is_rejected() {
        assert!(pack_index(&[SectorType::Cdda], 0).is_err());
        assert!(pack_index(&[SectorType::Cdda], 5).is_err());
        assert!(unpack_index(&[], 0).is_err());
    }

    #[test]
    fn best_width_prefers_the_smallest_packing() {
        // Alternating types favor single-byte counts.
        let mut alternating = Vec::new();
        for i in 0..1000 {
            alternating.push(if i % 2 == 0 {
                SectorType::Cdda
            } else {
                SectorType::Mode1
            });
        }
        assert_eq!(best_count_width(&alternating).unwrap(), 1);

        // One enormous run favors the widest counter.
        let long_run = vec![SectorType::Mode2Xa1; 80_000];
        assert_eq!(best_count_width(&long_run).unwrap(), 3);
    }
}
