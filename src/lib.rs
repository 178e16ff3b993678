//! # unitpack - Unit-Annotated Tabular Data Packages
//!
//! `unitpack` attaches machine-readable metadata and physical units to
//! tabular scientific data. A dataset is stored as a Frictionless Data
//! Package: a CSV file with the measurements and a JSON descriptor carrying
//! the column schema, the units, and free-form provenance metadata.
//!
//! ## Key Features
//!
//! - **Unit-tagged columns**: Every field of a resource can carry a unit
//!   expression such as `uA / cm2` and an optional reference annotation.
//!
//! - **Rescaling**: Column values are converted between compatible units
//!   with the schema updated in lockstep, so data and annotation never
//!   drift apart.
//!
//! - **Collections**: Directories (or remote ZIP archives) of Data Packages
//!   load into an ordered, filterable collection.
//!
//! - **Instrument loaders**: CSV-like files written by lab instruments,
//!   with metadata header blocks, decimal commas, and multi-line column
//!   headers, convert directly into annotated packages.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::io::Cursor;
//! use unitpack::entry::Entry;
//! use unitpack::schema::Field;
//!
//! let csv = "t,E,j\n0,-0.103158,-0.998277\n1,-0.102158,-0.981762\n";
//! let fields = vec![
//!     Field::new("t").with_unit("s"),
//!     Field::new("E").with_unit("V").with_reference("RHE"),
//!     Field::new("j").with_unit("A / m2"),
//! ];
//!
//! let entry = Entry::from_csv_reader(Cursor::new(csv), "demo", None, &fields)?;
//!
//! // Convert the current density to uA / cm2; values scale by 100.
//! let units = HashMap::from([("j".to_string(), "uA / cm2".to_string())]);
//! let rescaled = entry.rescale(&units)?;
//!
//! assert_eq!(rescaled.field_unit("j")?, "uA / cm2");
//! # Ok::<(), unitpack::package::PackageError>(())
//! ```
//!
//! Loading every package below a directory:
//!
//! ```rust,no_run
//! use unitpack::collection::Collection;
//!
//! let collection = Collection::from_local("data/")?;
//! for entry in &collection {
//!     println!("{}: {} rows", entry.identifier(), entry.frame().num_rows());
//! }
//! # Ok::<(), unitpack::collection::CollectionError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`units`]: Unit expression parsing and linear conversion factors
//! - [`schema`]: Table Schema fields with unit and reference annotations
//! - [`frame`]: Arrow-backed tables with CSV reading and writing
//! - [`descriptor`]: Navigation over free-form JSON metadata
//! - [`package`]: Data Package descriptors on disk
//! - [`entry`]: One annotated resource and its transformations
//! - [`collection`]: Ordered, filterable sets of entries
//! - [`local`]: Recursive Data Package discovery on disk
//! - [`remote`]: Collections downloaded from ZIP archives
//! - [`loaders`]: Instrument CSV readers with dialect sniffing
//!
//! ## Data Package Layout
//!
//! Saving an entry writes two files that load back unchanged:
//!
//! ```text
//! demo.csv     # the measurements, one header line
//! demo.json    # resource descriptor: schema, units, metadata
//! ```

#![allow(clippy::too_many_arguments)]

pub mod collection;
pub mod descriptor;
pub mod entry;
pub mod frame;
pub mod loaders;
pub mod local;
pub mod package;
pub mod schema;
pub mod units;

#[cfg(feature = "remote")]
pub mod remote;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::collection::{Collection, CollectionError};
    pub use crate::descriptor::Descriptor;
    pub use crate::entry::{metadata_from_yaml, Entry};
    pub use crate::frame::{DataFrame, FrameError};
    pub use crate::loaders::{CsvLoader, Device, LoaderError};
    pub use crate::package::{PackageDescriptor, PackageError, ResourceDescriptor};
    pub use crate::schema::{Field, FieldType, Schema};
    pub use crate::units::{conversion_factor, Quantity, Unit, UnitError};
}
