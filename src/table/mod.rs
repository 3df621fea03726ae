// src/table/mod.rs
pub mod load;
pub mod reshape;
pub mod world;

pub use load::{load_wide_csv, read_wide_csv};
pub use reshape::{melt, records_for_year, ChangeRecord};
pub use world::WorldAverage;

/// A CSV held as-is: an identifier column followed by one column per year.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    /// Header of the identifier column (e.g. `iso3`).
    pub id_column: String,
    /// Year headers, in file order.
    pub years: Vec<String>,
    pub rows: Vec<WideRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub id: String,
    /// One cell per entry of `WideTable::years`; `None` for blank/NA cells.
    pub values: Vec<Option<f64>>,
}

impl WideTable {
    pub fn row(&self, id: &str) -> Option<&WideRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn year_index(&self, year: &str) -> Option<usize> {
        self.years.iter().position(|y| y == year)
    }
}
