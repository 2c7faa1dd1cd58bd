use crate::error::ExtractError;
use crate::reader::JumpRead;

const WORD_BITS: usize = 64;

/// Resolution of a logical grid point against the presence bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointLookup {
    Missing,
    Present(usize),
}

/// Resolves every index in `[start, end)` to [`PointLookup::Missing`] or its
/// physical slot in the packed data section.
///
/// The bitmap is consumed in a single forward pass of big-endian 64-bit
/// words, carrying the running popcount; no re-seeking happens between
/// indices. Bits past `end` are never inspected, so the trailing byte
/// padding of the bitmap section is irrelevant.
pub(crate) fn scan_range<R: JumpRead>(
    reader: &mut R,
    bitmap_start: u64,
    start: usize,
    end: usize,
) -> Result<Vec<PointLookup>, ExtractError> {
    debug_assert!(start < end);
    reader.seek_to(bitmap_start)?;

    let mut lookups = Vec::with_capacity(end - start);
    let mut count = 0;
    let num_words = (end + WORD_BITS - 1) / WORD_BITS;
    for word_index in 0..num_words {
        let word = reader.read_word()?;
        let base = word_index * WORD_BITS;
        if base + WORD_BITS <= start {
            count += word.count_ones() as usize;
            continue;
        }
        for bit in 0..WORD_BITS {
            let index = base + bit;
            if index >= end {
                break;
            }
            let set = word & (1 << (WORD_BITS - 1 - bit)) != 0;
            if index < start {
                count += usize::from(set);
            } else if set {
                count += 1;
                lookups.push(PointLookup::Present(count - 1));
            } else {
                lookups.push(PointLookup::Missing);
            }
        }
    }
    Ok(lookups)
}

/// Resolves a single logical index; the degenerate one-point range.
pub(crate) fn lookup<R: JumpRead>(
    reader: &mut R,
    bitmap_start: u64,
    index: usize,
) -> Result<PointLookup, ExtractError> {
    let lookups = scan_range(reader, bitmap_start, index, index + 1)?;
    Ok(lookups[0])
}
