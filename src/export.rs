// src/export.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{fs, fs::File, path::Path, sync::Arc};
use tracing::info;

use crate::table::ChangeRecord;

pub fn long_table_schema() -> Schema {
    Schema::new(vec![
        Field::new("country_code", DataType::Utf8, false),
        Field::new("year", DataType::Utf8, false),
        Field::new("change_index", DataType::Float64, true),
    ])
}

/// Write the melted table to a single Parquet file.
pub fn write_long_table<P: AsRef<Path>>(records: &[ChangeRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {:?}", parent))?;
    }

    let schema = Arc::new(long_table_schema());
    let codes: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.country_code.as_str()),
    ));
    let years: ArrayRef = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.year.as_str()),
    ));
    let values: ArrayRef = Arc::new(Float64Array::from(
        records.iter().map(|r| r.change_index).collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(schema.clone(), vec![codes, years, values])
        .context("building long-table record batch")?;

    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing long table")?;
    writer.close().context("closing parquet writer")?;

    info!(rows = records.len(), path = %path.display(), "long table written");
    Ok(())
}
