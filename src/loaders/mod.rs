//! # Instrument CSV Loaders
//!
//! Readers for CSV-like files as instruments write them: metadata header
//! blocks, locale-dependent delimiters and decimal separators, and column
//! headers spread over several lines. A [`CsvLoader`] splits the file into
//! header and data, sniffs the dialect, and produces an [`Entry`] whose
//! recognized columns already carry units.
//!
//! ```rust
//! use std::io::Cursor;
//! use unitpack::loaders::{CsvLoader, Device};
//!
//! let file = "EC-Lab ASCII FILE\nNb header lines : 4\n\ntime/s\tEwe/V\n0\t-0,1\n";
//! let loader = CsvLoader::with_device(Cursor::new(file), Device::EcLab)?;
//! let entry = loader.into_entry("demo", None, &[])?;
//! assert_eq!(entry.field_unit("Ewe/V")?, "V");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{Cursor, Read};
use std::str::FromStr;

use log::debug;
use serde_json::Value;

use crate::entry::Entry;
use crate::frame::{DataFrame, FrameError};
use crate::package::PackageError;
use crate::schema::Field;
use crate::units::Unit;

mod column_names;
pub use column_names::known_field;


/// Delimiters tried during sniffing, in priority order
const DELIMITERS: [u8; 3] = [b'\t', b';', b','];

/// Errors raised while loading instrument CSV files
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// I/O error reading the input
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the reconstructed CSV data
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Error assembling the entry
    #[error(transparent)]
    Package(#[from] PackageError),

    /// File without the marker line its device format requires
    #[error("Missing '{marker}' line in {device} file")]
    MarkerNotFound {
        device: &'static str,
        marker: &'static str,
    },

    /// Unparseable header line count in the marker line
    #[error("Malformed header line count '{0}'")]
    HeaderCount(String),

    /// No delimiter splits the column header and data lines consistently
    #[error("No delimiter consistently separates the data columns")]
    Delimiter,

    /// Both `,` and `.` appear as decimal separators in the data
    #[error("Both ',' and '.' appear as decimal separators")]
    AmbiguousDecimal,

    /// Input with a header block but no data rows
    #[error("File contains no data rows")]
    NoData,

    /// Unrecognized device name
    #[error("Unknown device '{0}', expected 'generic', 'eclab' or 'gamry'")]
    UnknownDevice(String),
}

/// The instrument family a file was exported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// Plain CSV with a single header line
    #[default]
    Generic,
    /// BioLogic EC-Lab MPT export
    EcLab,
    /// Gamry DTA export
    Gamry,
}

impl FromStr for Device {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "csv" => Ok(Device::Generic),
            "eclab" => Ok(Device::EcLab),
            "gamry" => Ok(Device::Gamry),
            other => Err(LoaderError::UnknownDevice(other.to_string())),
        }
    }
}

/// Reader for instrument CSV files
///
/// The file is split into a metadata header, one or two column-header lines,
/// and the data block. Delimiter and decimal separator are detected from the
/// data.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    lines: Vec<String>,
    device: Device,
}

impl CsvLoader {
    /// Read a plain CSV file with a single header line
    pub fn new<R: Read>(reader: R) -> Result<Self, LoaderError> {
        Self::with_device(reader, Device::Generic)
    }

    /// Read a file in the named device's export format
    pub fn with_device<R: Read>(mut reader: R, device: Device) -> Result<Self, LoaderError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let lines = text
            .lines()
            .map(|line| line.trim_end().to_string())
            .collect();

        Ok(CsvLoader { lines, device })
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Number of metadata lines preceding the column header
    pub fn header_line_count(&self) -> Result<usize, LoaderError> {
        match self.device {
            Device::Generic => Ok(0),
            Device::EcLab => self.eclab_header_line_count(),
            Device::Gamry => self.gamry_header_line_count(),
        }
    }

    /// Number of lines making up the column header
    pub fn column_header_line_count(&self) -> usize {
        match self.device {
            // DTA files carry names and units on separate lines.
            Device::Gamry => 2,
            _ => 1,
        }
    }

    /// The metadata header block, verbatim
    pub fn header(&self) -> Result<Vec<&str>, LoaderError> {
        let count = self.header_line_count()?;
        Ok(self.lines[..count.min(self.lines.len())]
            .iter()
            .map(String::as_str)
            .collect())
    }

    /// The detected column delimiter
    pub fn delimiter(&self) -> Result<u8, LoaderError> {
        let start = self.header_line_count()?;
        let lines: Vec<&str> = self.lines[start.min(self.lines.len())..]
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .take(20)
            .collect();

        if lines.is_empty() {
            return Err(LoaderError::NoData);
        }

        for delimiter in DELIMITERS {
            let counts: Vec<usize> = lines
                .iter()
                .map(|line| line.bytes().filter(|b| *b == delimiter).count())
                .collect();
            if counts[0] > 0 && counts.iter().all(|c| *c == counts[0]) {
                return Ok(delimiter);
            }
        }

        // A single-column file contains no delimiter at all.
        if lines
            .iter()
            .all(|line| !line.bytes().any(|b| DELIMITERS.contains(&b)))
        {
            return Ok(b',');
        }

        Err(LoaderError::Delimiter)
    }

    /// The decimal separator used in the data block
    pub fn decimal(&self) -> Result<char, LoaderError> {
        let delimiter = self.delimiter()?;
        let mut commas = false;
        let mut dots = false;

        for line in self.data_lines()? {
            for token in line.split(delimiter as char).map(str::trim) {
                if token.contains('.') && token.parse::<f64>().is_ok() {
                    dots = true;
                }
                if token.contains(',') && token.replace(',', ".").parse::<f64>().is_ok() {
                    commas = true;
                }
            }
        }

        match (commas, dots) {
            (true, true) => Err(LoaderError::AmbiguousDecimal),
            (true, false) => Ok(','),
            _ => Ok('.'),
        }
    }

    /// The column names, joining multi-line headers as `name / unit`
    pub fn column_names(&self) -> Result<Vec<String>, LoaderError> {
        let delimiter = self.delimiter()? as char;
        let start = self.header_line_count()?;
        let header_lines: Vec<Vec<&str>> = self
            .lines
            .get(start..start + self.column_header_line_count())
            .ok_or(LoaderError::NoData)?
            .iter()
            .map(|line| line.trim().split(delimiter).map(str::trim).collect())
            .collect();

        match header_lines.as_slice() {
            [names] => Ok(names.iter().map(|n| n.to_string()).collect()),
            [names, units] => Ok(names
                .iter()
                .zip(units.iter())
                .map(|(name, unit)| {
                    if unit.is_empty() {
                        name.to_string()
                    } else {
                        format!("{name} / {unit}")
                    }
                })
                .collect()),
            _ => Err(LoaderError::NoData),
        }
    }

    /// The data block, without header and column-header lines
    fn data_lines(&self) -> Result<impl Iterator<Item = &str>, LoaderError> {
        let start = self.header_line_count()? + self.column_header_line_count();
        if start >= self.lines.len() {
            return Err(LoaderError::NoData);
        }

        Ok(self.lines[start..]
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty()))
    }

    /// Parse the data block into a table
    pub fn frame(&self) -> Result<DataFrame, LoaderError> {
        let delimiter = self.delimiter()?;
        let decimal = self.decimal()?;
        let names = self.column_names()?;

        let mut csv = names.join(&(delimiter as char).to_string());
        csv.push('\n');
        for line in self.data_lines()? {
            csv.push_str(line);
            csv.push('\n');
        }

        debug!(
            "Parsing {} columns with delimiter {:?} and decimal separator {:?}",
            names.len(),
            delimiter as char,
            decimal
        );

        Ok(DataFrame::from_csv_reader_with(
            Cursor::new(csv),
            delimiter,
            (decimal != '.').then_some(decimal),
        )?)
    }

    /// Unit annotations for the recognized columns
    ///
    /// Known instrument names such as `Ewe/V` come from the built-in table;
    /// for `name / unit` headers the unit part is used when it parses.
    pub fn field_hints(&self) -> Result<Vec<Field>, LoaderError> {
        Ok(self
            .column_names()?
            .iter()
            .filter_map(|name| {
                known_field(name).or_else(|| {
                    let (_, unit) = name.rsplit_once(" / ")?;
                    Unit::parse(unit)
                        .ok()
                        .map(|_| Field::new(name).with_unit(unit))
                })
            })
            .collect())
    }

    /// Build an [`Entry`] from the data block
    ///
    /// `fields` override the loader's own unit hints for columns named in
    /// both.
    pub fn into_entry(
        self,
        basename: &str,
        metadata: Option<Value>,
        fields: &[Field],
    ) -> Result<Entry, LoaderError> {
        let frame = self.frame()?;

        // merge_hints keeps the first hint per name, so caller fields win.
        let mut hints: Vec<Field> = fields.to_vec();
        for hint in self.field_hints()? {
            if !fields.iter().any(|f| f.name == hint.name) {
                hints.push(hint);
            }
        }

        Ok(Entry::from_frame(frame, basename, metadata, &hints)?)
    }

    fn eclab_header_line_count(&self) -> Result<usize, LoaderError> {
        let marker = self
            .lines
            .iter()
            .find(|line| line.starts_with("Nb header lines"))
            .ok_or(LoaderError::MarkerNotFound {
                device: "EC-Lab",
                marker: "Nb header lines",
            })?;

        let count = marker
            .split(':')
            .nth(1)
            .map(str::trim)
            .ok_or_else(|| LoaderError::HeaderCount(marker.clone()))?
            .parse::<usize>()
            .map_err(|_| LoaderError::HeaderCount(marker.clone()))?;

        // The advertised count includes the column-header line itself.
        Ok(count.saturating_sub(1))
    }

    fn gamry_header_line_count(&self) -> Result<usize, LoaderError> {
        self.lines
            .iter()
            .position(|line| {
                let mut tokens = line.split('\t');
                tokens.next() == Some("CURVE") && tokens.next() == Some("TABLE")
            })
            .map(|index| index + 1)
            .ok_or(LoaderError::MarkerNotFound {
                device: "Gamry",
                marker: "CURVE\tTABLE",
            })
    }
}
