use super::WideTable;

/// One `(country, year)` cell of the change-index table in long form.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub country_code: String,
    pub year: String,
    pub change_index: Option<f64>,
}

/// Melt a wide table into long form, one record per cell.
///
/// Output is column-major: every row for the first year, then every row for
/// the next year, rows in file order within each year. Missing cells are kept
/// as `None`, so the result always has `years × rows` records.
pub fn melt(table: &WideTable) -> Vec<ChangeRecord> {
    let mut out = Vec::with_capacity(table.years.len() * table.rows.len());
    for (col, year) in table.years.iter().enumerate() {
        for row in &table.rows {
            out.push(ChangeRecord {
                country_code: row.id.clone(),
                year: year.clone(),
                change_index: row.values.get(col).copied().flatten(),
            });
        }
    }
    out
}

/// Records for a single year, in melt order.
pub fn records_for_year<'a>(
    records: &'a [ChangeRecord],
    year: &'a str,
) -> impl Iterator<Item = &'a ChangeRecord> + 'a {
    records.iter().filter(move |r| r.year == year)
}
