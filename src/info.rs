use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Schema version of persisted metadata records.
pub(crate) const CURRENT_VERSION: u32 = 1;

/// The numeric header fields harvested once per GRIB message.
///
/// Implementors wrap whatever library parses the GRIB header; the extraction
/// core only ever sees these values plus the position of the message inside
/// its file.
pub trait GribHeader {
    fn reference_value(&self) -> f64;
    fn binary_scale_factor(&self) -> i32;
    fn decimal_scale_factor(&self) -> i32;
    fn bits_per_value(&self) -> u32;
    fn offset_before_data(&self) -> u64;
    fn bitmap_present(&self) -> bool;
    fn offset_before_bitmap(&self) -> u64;
    fn number_of_data_points(&self) -> u64;
    fn number_of_values(&self) -> u64;
    fn spherical_harmonics(&self) -> i32;
    fn message_start(&self) -> u64;
    fn total_length(&self) -> u64;
}

/// Compact metadata for one GRIB message, harvested once and persisted so
/// that values can later be extracted without re-parsing the header.
///
/// A record starts empty, is populated by [`GribInfo::update`] or one of the
/// loaders, and is read-only afterwards; any number of extractors may share
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GribInfo {
    pub(crate) reference_value: f64,
    pub(crate) binary_scale_factor: i32,
    pub(crate) decimal_scale_factor: i32,
    pub(crate) bits_per_value: u32,
    pub(crate) offset_before_data: u64,
    pub(crate) offset_before_bitmap: u64,
    pub(crate) number_of_data_points: u64,
    pub(crate) number_of_values: u64,
    pub(crate) spherical_harmonics: i32,
    pub(crate) binary_multiplier: f64,
    pub(crate) decimal_multiplier: f64,
    #[serde(skip)]
    pub(crate) msg_start_offset: u64,
    #[serde(skip)]
    pub(crate) total_length: u64,
    #[serde(skip)]
    pub(crate) version: u32,
}

impl Default for GribInfo {
    fn default() -> Self {
        Self {
            reference_value: 0.0,
            binary_scale_factor: 0,
            decimal_scale_factor: 0,
            bits_per_value: 0,
            offset_before_data: 0,
            offset_before_bitmap: 0,
            number_of_data_points: 0,
            number_of_values: 0,
            spherical_harmonics: 0,
            binary_multiplier: 1.0,
            decimal_multiplier: 1.0,
            msg_start_offset: 0,
            total_length: 0,
            version: CURRENT_VERSION,
        }
    }
}

impl GribInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulls the raw header fields from the harvest collaborator and computes
    /// the derived multipliers. `offsetBeforeBitmap` is zero iff the header
    /// reports no bitmap.
    pub fn update(&mut self, header: &impl GribHeader) {
        self.binary_scale_factor = header.binary_scale_factor();
        self.decimal_scale_factor = header.decimal_scale_factor();
        self.bits_per_value = header.bits_per_value();
        self.reference_value = header.reference_value();
        self.offset_before_data = header.offset_before_data();
        self.number_of_data_points = header.number_of_data_points();
        self.number_of_values = header.number_of_values();
        self.spherical_harmonics = header.spherical_harmonics();
        self.offset_before_bitmap = if header.bitmap_present() {
            header.offset_before_bitmap()
        } else {
            0
        };
        self.msg_start_offset = header.message_start();
        self.total_length = header.total_length();
        self.binary_multiplier = 2f64.powi(self.binary_scale_factor);
        self.decimal_multiplier = 10f64.powi(-self.decimal_scale_factor);
        self.version = CURRENT_VERSION;
    }

    /// True once the record describes a message with encoded values.
    pub fn ready(&self) -> bool {
        self.number_of_values > 0
    }

    /// True iff values can be extracted through this record.
    pub fn is_extractable(&self) -> bool {
        self.ready() && self.spherical_harmonics == 0
    }

    pub fn number_of_data_points(&self) -> u64 {
        self.number_of_data_points
    }

    pub fn number_of_values(&self) -> u64 {
        self.number_of_values
    }

    pub fn message_start(&self) -> u64 {
        self.msg_start_offset
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Writes the record as a flat JSON object. Floats are emitted in the
    /// shortest form that parses back to the identical IEEE-754 double.
    pub fn to_json<W: Write>(&self, out: W) -> std::io::Result<()> {
        serde_json::to_writer(out, self).map_err(std::io::Error::from)
    }

    /// Loads a record from its JSON form and checks its invariants. The
    /// message position fields are not part of the JSON schema and come back
    /// as zero.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let f = File::open(path)?;
        let mut info: GribInfo = serde_json::from_reader(BufReader::new(f))?;
        info.version = CURRENT_VERSION;
        info.validate()?;
        Ok(info)
    }

    pub(crate) fn validate(&self) -> Result<(), ParseError> {
        if self.bits_per_value > 64 {
            return Err(ParseError::InvariantViolation(format!(
                "bitsPerValue {} exceeds 64",
                self.bits_per_value
            )));
        }
        if self.number_of_values > self.number_of_data_points {
            return Err(ParseError::InvariantViolation(format!(
                "numberOfValues {} exceeds numberOfDataPoints {}",
                self.number_of_values, self.number_of_data_points
            )));
        }
        if (self.offset_before_bitmap == 0) != (self.number_of_values == self.number_of_data_points)
        {
            return Err(ParseError::InvariantViolation(format!(
                "bitmap offset {} disagrees with {} values over {} data points",
                self.offset_before_bitmap, self.number_of_values, self.number_of_data_points
            )));
        }
        if self.binary_multiplier != 2f64.powi(self.binary_scale_factor) {
            return Err(ParseError::InvariantViolation(format!(
                "binaryMultiplier {} does not match binaryScaleFactor {}",
                self.binary_multiplier, self.binary_scale_factor
            )));
        }
        if self.decimal_multiplier != 10f64.powi(-self.decimal_scale_factor) {
            return Err(ParseError::InvariantViolation(format!(
                "decimalMultiplier {} does not match decimalScaleFactor {}",
                self.decimal_multiplier, self.decimal_scale_factor
            )));
        }
        Ok(())
    }
}

impl Display for GribInfo {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "\
Reference value:        {}
Binary scale factor:    {}
Decimal scale factor:   {}
Bits per value:         {}
Offset before data:     {}
Offset before bitmap:   {}
Number of data points:  {}
Number of values:       {}
Spherical harmonics:    {}
Message start offset:   {}
Total length:           {}\
",
            self.reference_value,
            self.binary_scale_factor,
            self.decimal_scale_factor,
            self.bits_per_value,
            self.offset_before_data,
            self.offset_before_bitmap,
            self.number_of_data_points,
            self.number_of_values,
            self.spherical_harmonics,
            self.msg_start_offset,
            self.total_length
        )
    }
}
