//! # Tabular Data
//!
//! A thin dataframe layer over an Arrow [`RecordBatch`]: CSV reading with
//! per-column type inference, CSV writing, and the column operations the
//! entry transformations need (scaling, renaming, appending).
//!
//! Columns are `Int64` when every value is integral, `Float64` for other
//! numeric columns, and `Utf8` otherwise. Empty cells become nulls.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float64Array, Float64Builder, Int64Array, Int64Builder, StringBuilder,
};
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;

use crate::schema::FieldType;

/// Errors from tabular data handling
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// I/O error reading or writing CSV data
    #[error("Failed to read or write tabular data: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Arrow-level error building a record batch
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Reference to a column that does not exist
    #[error("No column named '{0}'")]
    ColumnNotFound(String),

    /// Numeric operation on a non-numeric column
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    /// Appended column whose length differs from the table
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// CSV input without a header line
    #[error("CSV input has no header line")]
    MissingHeader,
}

/// In-memory table with named, typed columns
#[derive(Debug, Clone)]
pub struct DataFrame {
    batch: RecordBatch,
}

impl DataFrame {
    /// Wrap an existing record batch
    pub fn from_batch(batch: RecordBatch) -> Self {
        DataFrame { batch }
    }

    /// Build a table from named `f64` columns
    pub fn from_f64_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self, FrameError> {
        let fields: Vec<ArrowField> = columns
            .iter()
            .map(|(name, _)| ArrowField::new(name, DataType::Float64, true))
            .collect();
        let arrays: Vec<ArrayRef> = columns
            .into_iter()
            .map(|(_, values)| Arc::new(Float64Array::from(values)) as ArrayRef)
            .collect();

        let batch = RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), arrays)?;
        Ok(DataFrame { batch })
    }

    /// Parse CSV with a single header line, inferring column types
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, FrameError> {
        Self::from_csv_reader_with(reader, b',', None)
    }

    /// Parse CSV with an explicit delimiter and, for locales using a decimal
    /// comma, the decimal separator to normalize before numeric inference
    pub fn from_csv_reader_with<R: Read>(
        reader: R,
        delimiter: u8,
        decimal: Option<char>,
    ) -> Result<Self, FrameError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(false)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() {
            return Err(FrameError::MissingHeader);
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in csv_reader.records() {
            let record = record?;
            for (index, value) in record.iter().enumerate() {
                if index >= headers.len() {
                    break;
                }
                let mut value = value.trim().to_string();
                if let Some(separator) = decimal {
                    if separator != '.' && looks_numeric(&value, separator) {
                        value = value.replace(separator, ".");
                    }
                }
                cells[index].push(value);
            }
        }

        let mut fields = Vec::with_capacity(headers.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(headers.len());

        for (name, column) in headers.iter().zip(&cells) {
            let (data_type, array) = infer_column(column);
            fields.push(ArrowField::new(name, data_type, true));
            arrays.push(array);
        }

        let batch = RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), arrays)?;
        Ok(DataFrame { batch })
    }

    /// The underlying record batch
    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// The raw Arrow column, if present
    pub fn column(&self, name: &str) -> Option<ArrayRef> {
        self.batch.column_by_name(name).cloned()
    }

    /// The descriptor type matching a column's Arrow type
    pub fn field_type(&self, name: &str) -> Result<FieldType, FrameError> {
        let index = self.column_index(name)?;
        Ok(match self.batch.schema().field(index).data_type() {
            DataType::Int64 => FieldType::Integer,
            DataType::Float64 => FieldType::Number,
            _ => FieldType::String,
        })
    }

    /// Numeric values of a column, widening integers to `f64`
    ///
    /// Nulls become `NaN`.
    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>, FrameError> {
        let index = self.column_index(name)?;
        let column = self.batch.column(index);

        if let Some(array) = column.as_any().downcast_ref::<Float64Array>() {
            return Ok((0..array.len())
                .map(|i| if array.is_null(i) { f64::NAN } else { array.value(i) })
                .collect());
        }
        if let Some(array) = column.as_any().downcast_ref::<Int64Array>() {
            return Ok((0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        f64::NAN
                    } else {
                        array.value(i) as f64
                    }
                })
                .collect());
        }

        Err(FrameError::NotNumeric(name.to_string()))
    }

    /// A new table with one column multiplied by `factor`
    ///
    /// Integer columns become `Float64` in the result.
    pub fn scaled(&self, name: &str, factor: f64) -> Result<DataFrame, FrameError> {
        let index = self.column_index(name)?;
        let values = self.column_f64(name)?;

        let scaled =
            Float64Array::from(values.into_iter().map(|v| v * factor).collect::<Vec<f64>>());

        let mut fields: Vec<ArrowField> = self
            .batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        fields[index] = ArrowField::new(name, DataType::Float64, true);

        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();
        columns[index] = Arc::new(scaled);

        let batch = RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), columns)?;
        Ok(DataFrame { batch })
    }

    /// A new table with columns renamed according to `names`
    pub fn renamed(&self, names: &HashMap<String, String>) -> Result<DataFrame, FrameError> {
        let fields: Vec<ArrowField> = self
            .batch
            .schema()
            .fields()
            .iter()
            .map(|f| {
                let name = names.get(f.name()).unwrap_or(f.name());
                ArrowField::new(name, f.data_type().clone(), f.is_nullable())
            })
            .collect();

        let batch = RecordBatch::try_new(
            Arc::new(ArrowSchema::new(fields)),
            self.batch.columns().to_vec(),
        )?;
        Ok(DataFrame { batch })
    }

    /// A new table with an `f64` column appended
    pub fn with_column(&self, name: &str, values: Vec<f64>) -> Result<DataFrame, FrameError> {
        if values.len() != self.num_rows() {
            return Err(FrameError::LengthMismatch {
                column: name.to_string(),
                expected: self.num_rows(),
                actual: values.len(),
            });
        }

        let mut fields: Vec<ArrowField> = self
            .batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        fields.push(ArrowField::new(name, DataType::Float64, true));

        let mut columns = self.batch.columns().to_vec();
        columns.push(Arc::new(Float64Array::from(values)) as ArrayRef);

        let batch = RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), columns)?;
        Ok(DataFrame { batch })
    }

    /// Write the table as CSV with a header line
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), FrameError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(self.column_names())?;

        for row in 0..self.num_rows() {
            let record: Vec<String> = (0..self.num_columns())
                .map(|col| format_cell(self.batch.column(col), row))
                .collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn column_index(&self, name: &str) -> Result<usize, FrameError> {
        self.batch
            .schema()
            .index_of(name)
            .map_err(|_| FrameError::ColumnNotFound(name.to_string()))
    }
}

/// Whether a string is numeric once `separator` is read as the decimal point
fn looks_numeric(value: &str, separator: char) -> bool {
    !value.is_empty() && value.replace(separator, ".").parse::<f64>().is_ok()
}

/// Infer the Arrow type of a string column and build its array
fn infer_column(values: &[String]) -> (DataType, ArrayRef) {
    let non_empty = || values.iter().filter(|v| !v.is_empty());

    let all_integers =
        non_empty().count() > 0 && non_empty().all(|v| v.parse::<i64>().is_ok());
    if all_integers {
        let mut builder = Int64Builder::with_capacity(values.len());
        for value in values {
            if value.is_empty() {
                builder.append_null();
            } else {
                builder.append_option(value.parse::<i64>().ok());
            }
        }
        return (DataType::Int64, Arc::new(builder.finish()));
    }

    let all_numbers =
        non_empty().count() > 0 && non_empty().all(|v| v.parse::<f64>().is_ok());
    if all_numbers {
        let mut builder = Float64Builder::with_capacity(values.len());
        for value in values {
            if value.is_empty() {
                builder.append_null();
            } else {
                builder.append_option(value.parse::<f64>().ok());
            }
        }
        return (DataType::Float64, Arc::new(builder.finish()));
    }

    let mut builder = StringBuilder::new();
    for value in values {
        if value.is_empty() {
            builder.append_null();
        } else {
            builder.append_value(value);
        }
    }
    (DataType::Utf8, Arc::new(builder.finish()))
}

/// Format one cell for CSV output; nulls become empty strings
fn format_cell(column: &ArrayRef, row: usize) -> String {
    if column.is_null(row) {
        return String::new();
    }

    if let Some(array) = column.as_any().downcast_ref::<Int64Array>() {
        return array.value(row).to_string();
    }
    if let Some(array) = column.as_any().downcast_ref::<Float64Array>() {
        return array.value(row).to_string();
    }
    if let Some(array) = column
        .as_any()
        .downcast_ref::<arrow::array::StringArray>()
    {
        return array.value(row).to_string();
    }

    String::new()
}
