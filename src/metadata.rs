//! The binary metadata file that accompanies a GRIB file across restarts.
//!
//! Layout: a 12-byte header (schema version as a big-endian `u32`, record
//! count as a big-endian `u64`), then one 104-byte record per message in
//! message order. Each record packs the metadata payload fields in JSON key
//! order, each widened to 8 bytes big-endian, followed by the message start
//! offset and total length.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::ParseError;
use crate::info::{GribInfo, CURRENT_VERSION};

const RECORD_SIZE: usize = 104;

macro_rules! read_as {
    ($ty:ty, $buf:ident, $start:expr) => {{
        let end = $start + std::mem::size_of::<$ty>();
        <$ty>::from_be_bytes($buf[$start..end].try_into().unwrap())
    }};
}

/// Writes a version-1 metadata stream holding `infos` in message order.
pub fn write_to<W: Write>(mut out: W, infos: &[GribInfo]) -> io::Result<()> {
    out.write_all(&CURRENT_VERSION.to_be_bytes())?;
    out.write_all(&(infos.len() as u64).to_be_bytes())?;
    for info in infos {
        out.write_all(&encode_record(info))?;
    }
    Ok(())
}

pub fn write_file<P: AsRef<Path>>(path: P, infos: &[GribInfo]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_to(&mut out, infos)?;
    out.flush()
}

/// Reads back every record, rejecting unknown schema versions and records
/// that violate the metadata invariants.
pub fn read_from<R: Read>(mut input: R) -> Result<Vec<GribInfo>, ParseError> {
    let mut header = [0; 12];
    input.read_exact(&mut header)?;
    let version = read_as!(u32, header, 0);
    if version != CURRENT_VERSION {
        return Err(ParseError::VersionMismatch(version));
    }
    let count = read_as!(u64, header, 4) as usize;

    let mut infos = Vec::with_capacity(count);
    let mut buf = [0; RECORD_SIZE];
    for _ in 0..count {
        input.read_exact(&mut buf)?;
        let info = decode_record(&buf)?;
        info.validate()?;
        infos.push(info);
    }
    Ok(infos)
}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<GribInfo>, ParseError> {
    read_from(BufReader::new(File::open(path)?))
}

/// Reads the record of the `index`-th message of the file.
pub fn read_message<P: AsRef<Path>>(path: P, index: usize) -> Result<GribInfo, ParseError> {
    let mut infos = read_file(path)?;
    if index >= infos.len() {
        return Err(ParseError::NoSuchMessage(index));
    }
    Ok(infos.swap_remove(index))
}

fn encode_record(info: &GribInfo) -> [u8; RECORD_SIZE] {
    let mut buf = [0; RECORD_SIZE];
    let mut pos = 0;
    macro_rules! put {
        ($bytes:expr) => {{
            let bytes = $bytes;
            buf[pos..pos + bytes.len()].copy_from_slice(&bytes);
            pos += bytes.len();
        }};
    }
    put!(i64::from(info.binary_scale_factor).to_be_bytes());
    put!(i64::from(info.decimal_scale_factor).to_be_bytes());
    put!(u64::from(info.bits_per_value).to_be_bytes());
    put!(info.reference_value.to_be_bytes());
    put!(info.offset_before_data.to_be_bytes());
    put!(info.number_of_data_points.to_be_bytes());
    put!(info.number_of_values.to_be_bytes());
    put!(info.offset_before_bitmap.to_be_bytes());
    put!(i64::from(info.spherical_harmonics).to_be_bytes());
    put!(info.binary_multiplier.to_be_bytes());
    put!(info.decimal_multiplier.to_be_bytes());
    put!(info.msg_start_offset.to_be_bytes());
    put!(info.total_length.to_be_bytes());
    debug_assert_eq!(pos, RECORD_SIZE);
    buf
}

fn decode_record(buf: &[u8; RECORD_SIZE]) -> Result<GribInfo, ParseError> {
    Ok(GribInfo {
        binary_scale_factor: narrow_i32(read_as!(i64, buf, 0), "binaryScaleFactor")?,
        decimal_scale_factor: narrow_i32(read_as!(i64, buf, 8), "decimalScaleFactor")?,
        bits_per_value: narrow_u32(read_as!(u64, buf, 16), "bitsPerValue")?,
        reference_value: read_as!(f64, buf, 24),
        offset_before_data: read_as!(u64, buf, 32),
        number_of_data_points: read_as!(u64, buf, 40),
        number_of_values: read_as!(u64, buf, 48),
        offset_before_bitmap: read_as!(u64, buf, 56),
        spherical_harmonics: narrow_i32(read_as!(i64, buf, 64), "sphericalHarmonics")?,
        binary_multiplier: read_as!(f64, buf, 72),
        decimal_multiplier: read_as!(f64, buf, 80),
        msg_start_offset: read_as!(u64, buf, 88),
        total_length: read_as!(u64, buf, 96),
        version: CURRENT_VERSION,
    })
}

fn narrow_i32(value: i64, key: &str) -> Result<i32, ParseError> {
    i32::try_from(value).map_err(|_| ParseError::ValueOutOfRange(format!("{key} = {value}")))
}

fn narrow_u32(value: u64, key: &str) -> Result<u32, ParseError> {
    u32::try_from(value).map_err(|_| ParseError::ValueOutOfRange(format!("{key} = {value}")))
}
