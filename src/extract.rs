use num::ToPrimitive;

use crate::bitmap::{self, PointLookup};
use crate::bits::{self, PackedValueIterator};
use crate::error::ExtractError;
use crate::info::GribInfo;
use crate::reader::JumpRead;

/// Substituted for grid points the bitmap marks as absent.
pub const MISSING: f64 = 9999.0;

/// A half-open `[start, end)` interval of grid point indices.
pub type PointRange = (usize, usize);

/// Extracts decoded values at arbitrary grid point indices by seeking
/// directly into the packed data section of one GRIB message.
///
/// The extractor borrows the immutable metadata record and owns the reader
/// for the duration of the call sequence, since extraction mutates the seek
/// pointer. [`Extractor::into_reader`] hands the reader back.
pub struct Extractor<'i, R> {
    info: &'i GribInfo,
    reader: R,
}

impl<'i, R> Extractor<'i, R> {
    pub fn new(info: &'i GribInfo, reader: R) -> Self {
        Self { info, reader }
    }

    pub fn into_reader(self) -> R {
        self.reader
    }
}

impl<'i, R: JumpRead> Extractor<'i, R> {
    /// Returns the physical value at logical grid point `index`, or
    /// [`MISSING`] if the bitmap marks the point absent.
    pub fn value_at(&mut self, index: usize) -> Result<f64, ExtractError> {
        let info = self.info;
        self.check_extractable()?;
        if index as u64 >= info.number_of_data_points {
            return Err(ExtractError::InvalidArgument(format!(
                "index {index} out of range for {} data points",
                info.number_of_data_points
            )));
        }

        // A zero-width field is constant; every present value is the
        // reference value and no data section exists to read.
        if info.bits_per_value == 0 {
            return Ok(info.reference_value);
        }

        let slot = if info.offset_before_bitmap != 0 {
            let bitmap_start = info.msg_start_offset + info.offset_before_bitmap;
            match bitmap::lookup(&mut self.reader, bitmap_start, index)? {
                PointLookup::Missing => return Ok(MISSING),
                PointLookup::Present(slot) => slot,
            }
        } else {
            index
        };

        if slot as u64 >= info.number_of_values {
            return Err(ExtractError::CorruptMessage(format!(
                "index {index} resolves to slot {slot} but only {} values are encoded",
                info.number_of_values
            )));
        }

        self.read_value(slot)
    }

    /// Extracts every value covered by `ranges`, concatenating per-range
    /// results in input order, ascending within each range. Missing points
    /// come back as [`MISSING`].
    pub fn values_in_ranges(&mut self, ranges: &[PointRange]) -> Result<Vec<f64>, ExtractError> {
        self.check_extractable()?;
        if ranges.is_empty() {
            return Err(ExtractError::InvalidArgument("no ranges given".to_owned()));
        }
        let info = self.info;
        for (start, end) in ranges {
            if start >= end || *end as u64 > info.number_of_data_points {
                return Err(ExtractError::InvalidArgument(format!(
                    "invalid range {start}..{end} for {} data points",
                    info.number_of_data_points
                )));
            }
        }

        let total = ranges.iter().map(|(start, end)| end - start).sum();
        let mut values = Vec::with_capacity(total);
        for (start, end) in ranges {
            self.extract_range(*start, *end, &mut values)?;
        }
        Ok(values)
    }

    /// Extracts one range, appending to `values`. The bitmap is scanned in
    /// one forward pass, and the packed integers covering the range's slots
    /// are read with a single contiguous read.
    fn extract_range(
        &mut self,
        start: usize,
        end: usize,
        values: &mut Vec<f64>,
    ) -> Result<(), ExtractError> {
        let info = self.info;
        if info.bits_per_value == 0 {
            values.resize(values.len() + (end - start), info.reference_value);
            return Ok(());
        }

        let lookups = if info.offset_before_bitmap != 0 {
            let bitmap_start = info.msg_start_offset + info.offset_before_bitmap;
            bitmap::scan_range(&mut self.reader, bitmap_start, start, end)?
        } else {
            (start..end).map(PointLookup::Present).collect()
        };

        let first_slot = lookups.iter().find_map(|lookup| match lookup {
            PointLookup::Present(slot) => Some(*slot),
            PointLookup::Missing => None,
        });
        let Some(first_slot) = first_slot else {
            values.resize(values.len() + (end - start), MISSING);
            return Ok(());
        };

        // Present points resolve to consecutive slots, so the range's values
        // occupy one contiguous run of the data section.
        let num_present = lookups
            .iter()
            .filter(|lookup| matches!(lookup, PointLookup::Present(_)))
            .count();
        let last_slot = first_slot + num_present - 1;
        if last_slot as u64 >= info.number_of_values {
            return Err(ExtractError::CorruptMessage(format!(
                "range {start}..{end} resolves to slot {last_slot} but only {} values are encoded",
                info.number_of_values
            )));
        }

        let width = info.bits_per_value as usize;
        let first_bit = first_slot * width;
        let end_bit = (last_slot + 1) * width;
        let byte_start = first_bit / 8;
        let byte_end = (end_bit + 7) / 8;
        self.reader
            .seek_to(info.msg_start_offset + info.offset_before_data + byte_start as u64)?;
        let mut buf = vec![0; byte_end - byte_start];
        self.reader.read_chunk(&mut buf)?;

        let packed = PackedValueIterator::new(&buf, width).with_offset(first_bit % 8);
        let mut decoded = PackedValueDecoder::new(packed, info);
        for lookup in &lookups {
            match lookup {
                PointLookup::Missing => values.push(MISSING),
                PointLookup::Present(_) => values.push(decoded.next().ok_or_else(|| {
                    ExtractError::CorruptMessage(format!(
                        "packed data ended before slot {last_slot}"
                    ))
                })?),
            }
        }
        Ok(())
    }

    fn read_value(&mut self, slot: usize) -> Result<f64, ExtractError> {
        let info = self.info;
        let width = info.bits_per_value as usize;
        let bit_offset = slot * width;
        self.reader.seek_to(
            info.msg_start_offset + info.offset_before_data + (bit_offset / 8) as u64,
        )?;

        // A value of up to 64 bits spans at most 9 bytes once the bit offset
        // within the first byte is taken into account.
        let start_bit = bit_offset % 8;
        let len = (start_bit + width + 7) / 8;
        let mut buf = [0u8; 9];
        self.reader.read_chunk(&mut buf[..len])?;

        let packed = bits::decode_unsigned(&buf[..len], start_bit, width)?;
        Ok(reconstruct(
            packed as f64,
            info.binary_multiplier,
            info.reference_value,
            info.decimal_multiplier,
        ))
    }

    fn check_extractable(&self) -> Result<(), ExtractError> {
        let info = self.info;
        if !info.ready() {
            return Err(ExtractError::InvalidArgument(
                "metadata record describes no encoded values".to_owned(),
            ));
        }
        if info.spherical_harmonics != 0 {
            return Err(ExtractError::NotSupported(
                "spherical harmonics packing".to_owned(),
            ));
        }
        if info.bits_per_value > 64 {
            return Err(ExtractError::NotSupported(format!(
                "packing wider than 64 bits per value: {}",
                info.bits_per_value
            )));
        }
        Ok(())
    }
}

// The reconstruction order is part of the decoding contract; reordering the
// operations changes last-bit results for some messages.
fn reconstruct(
    packed: f64,
    binary_multiplier: f64,
    reference_value: f64,
    decimal_multiplier: f64,
) -> f64 {
    (packed * binary_multiplier + reference_value) * decimal_multiplier
}

/// Maps packed integers to physical values for one metadata record.
struct PackedValueDecoder<I> {
    iter: I,
    reference_value: f64,
    binary_multiplier: f64,
    decimal_multiplier: f64,
}

impl<I> PackedValueDecoder<I> {
    fn new(iter: I, info: &GribInfo) -> Self {
        Self {
            iter,
            reference_value: info.reference_value,
            binary_multiplier: info.binary_multiplier,
            decimal_multiplier: info.decimal_multiplier,
        }
    }
}

impl<I: Iterator<Item = N>, N: ToPrimitive> Iterator for PackedValueDecoder<I> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|encoded| {
            reconstruct(
                encoded.to_f64().unwrap(),
                self.binary_multiplier,
                self.reference_value,
                self.decimal_multiplier,
            )
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}
