//! CSV-backed `StatsSink`.
//!
//! Writes one row per observation to a single file:
//! `seq,name,value,aggregation`.

use std::fs::File;
use std::path::Path;

use adt_core::BoxError;
use adt_stats::{Aggregation, StatsSink};
use csv::Writer;
use serde::Serialize;

#[derive(Serialize)]
struct StatRow<'a> {
    seq:         u64,
    name:        &'a str,
    value:       f64,
    aggregation: Aggregation,
}

pub struct CsvStatsSink {
    writer: Writer<File>,
    rows:   u64,
}

impl CsvStatsSink {
    /// Create (or truncate) `path`.  The header is written with the first row.
    pub fn create(path: &Path) -> csv::Result<Self> {
        Ok(Self { writer: Writer::from_path(path)?, rows: 0 })
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn finish(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl StatsSink for CsvStatsSink {
    fn record(&mut self, name: &str, value: f64, aggregation: Aggregation) -> Result<(), BoxError> {
        self.writer.serialize(StatRow { seq: self.rows, name, value, aggregation })?;
        self.rows += 1;
        Ok(())
    }
}
