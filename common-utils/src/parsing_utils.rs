//! # Parsing utils
//!
//! This module contains functions related to parsing the CSV input files our applications accept.
//!

use csv::{Reader, ReaderBuilder, Trim};
use std::{fs::File, path::Path};

/// Produces a csv reader with a predefined buffer capacity that expects a header row.
/// Surrounding whitespace is trimmed from headers and fields, so hand written files parse as expected.
pub fn customised_csv_reader<P: AsRef<Path>>(
    path: P,
    buffer_capacity: usize,
) -> csv::Result<Reader<File>> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .buffer_capacity(buffer_capacity)
        .from_path(path)
}
