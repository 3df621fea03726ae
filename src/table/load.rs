use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use std::{collections::HashSet, fs::File, io::Read, path::Path};
use tracing::debug;

use super::{WideRow, WideTable};

/// Open `path` and parse it as a wide table.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_wide_csv<P: AsRef<Path>>(path: P) -> Result<WideTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    read_wide_csv(file).with_context(|| format!("Failed to parse {:?}", path.as_ref()))
}

/// Parse a wide table: first header is the identifier column, every other
/// header is a year. Blank, `NA` and `NaN` cells are missing values.
pub fn read_wide_csv<R: Read>(reader: R) -> Result<WideTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading CSV header")?.clone();
    let mut cols = headers.iter().map(str::to_string);
    let id_column = cols
        .next()
        .ok_or_else(|| anyhow!("CSV has no header row"))?;
    let years: Vec<String> = cols.collect();

    // each year becomes one frame file, so a repeat would overwrite it
    let mut seen = HashSet::with_capacity(years.len());
    for (idx, year) in years.iter().enumerate() {
        if !seen.insert(year.as_str()) {
            bail!("year column `{}` repeated (column {})", year, idx + 2);
        }
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        if record.len() != years.len() + 1 {
            bail!(
                "record {} has {} fields, header has {}",
                idx,
                record.len(),
                years.len() + 1
            );
        }

        let id = record.get(0).unwrap_or_default().to_string();
        let values = record
            .iter()
            .skip(1)
            .zip(&years)
            .map(|(cell, year)| {
                parse_cell(cell)
                    .with_context(|| format!("row `{}` (record {}), column `{}`", id, idx, year))
            })
            .collect::<Result<Vec<_>>>()?;

        rows.push(WideRow { id, values });
    }

    debug!(
        id_column = %id_column,
        years = years.len(),
        rows = rows.len(),
        "loaded wide table"
    );

    Ok(WideTable {
        id_column,
        years,
        rows,
    })
}

fn parse_cell(cell: &str) -> Result<Option<f64>> {
    match cell {
        "" | "NA" | "N/A" | "NaN" | "nan" => Ok(None),
        s => {
            let v: f64 = s
                .parse()
                .with_context(|| format!("`{}` is not a number", s))?;
            Ok(if v.is_nan() { None } else { Some(v) })
        }
    }
}
