use anyhow::{anyhow, Result};
use std::collections::HashMap;

use super::WideTable;

/// Global average change per year, read from the aggregate row of the
/// per-region table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldAverage {
    by_year: HashMap<String, f64>,
}

impl WorldAverage {
    /// Pull row `key` out of `table`. Missing cells are left out, so a lookup
    /// for that year fails later.
    pub fn from_table(table: &WideTable, key: &str) -> Result<Self> {
        let row = table.row(key).ok_or_else(|| {
            anyhow!(
                "no `{}` row in region table (identifier column `{}`)",
                key,
                table.id_column
            )
        })?;

        let by_year = table
            .years
            .iter()
            .zip(&row.values)
            .filter_map(|(year, v)| v.map(|v| (year.clone(), v)))
            .collect();
        Ok(Self { by_year })
    }

    pub fn get(&self, year: &str) -> Option<f64> {
        self.by_year.get(year).copied()
    }

    /// Like `get`, but a missing year is an error.
    pub fn require(&self, year: &str) -> Result<f64> {
        self.get(year)
            .ok_or_else(|| anyhow!("no world average for year {}", year))
    }

    /// Every year in `years` must have an entry; reports all that are missing.
    pub fn check_covers<'a, I>(&self, years: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let missing: Vec<&str> = years
            .into_iter()
            .filter(|y| !self.by_year.contains_key(y.as_str()))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("no world average for years: {}", missing.join(", ")))
        }
    }

    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_wide_csv;

    const REGIONS: &str = "\
region,1961,1962,1963
africa,0.1,0.2,0.3
world,0.21,-0.05,
";

    #[test]
    fn looks_up_world_row() -> Result<()> {
        let table = read_wide_csv(REGIONS.as_bytes())?;
        let avg = WorldAverage::from_table(&table, "world")?;
        assert_eq!(avg.get("1961"), Some(0.21));
        assert_eq!(avg.require("1962")?, -0.05);
        assert_eq!(avg.len(), 2);
        Ok(())
    }

    #[test]
    fn blank_cell_fails_lookup() -> Result<()> {
        let table = read_wide_csv(REGIONS.as_bytes())?;
        let avg = WorldAverage::from_table(&table, "world")?;
        assert!(avg.require("1963").is_err());

        let years = vec!["1961".to_string(), "1963".to_string(), "1970".to_string()];
        let err = avg.check_covers(&years).unwrap_err().to_string();
        assert!(err.contains("1963") && err.contains("1970"), "{}", err);
        assert!(!err.contains("1961"));
        Ok(())
    }

    #[test]
    fn missing_world_row_is_an_error() -> Result<()> {
        let table = read_wide_csv("region,2000\nasia,1\n".as_bytes())?;
        assert!(WorldAverage::from_table(&table, "world").is_err());
        Ok(())
    }
}
