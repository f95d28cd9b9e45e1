use crate::dataset::{read_dataset_csv, RentalRow};
use crate::types::FastMap;

use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::path::Path;

/// Used when no listing data is available.
pub const DEFAULT_DISTRICT_AVERAGES: &[(&str, f64)] =
    &[("Gasabo", 450_000.), ("Kicukiro", 420_000.), ("Nyarugenge", 480_000.)];

pub fn default_averages() -> BTreeMap<String, f64> {
    DEFAULT_DISTRICT_AVERAGES.iter().map(|(d, v)| (d.to_string(), *v)).collect()
}

/// Mean rent per district, rounded to whole francs.
pub fn district_averages(rows: &[RentalRow]) -> BTreeMap<String, f64> {
    let mut grouped: FastMap<&str, Vec<f64>> = FastMap::default();
    for row in rows {
        grouped.entry(row.district.as_str()).or_default().push(row.rent);
    }

    grouped
        .into_iter()
        .map(|(district, rents)| (district.to_owned(), rents.iter().mean().round()))
        .collect()
}

/// Averages from a listing file, or the fixed table if there is none or it is unreadable.
pub fn load_averages(path: Option<&Path>) -> BTreeMap<String, f64> {
    let Some(path) = path else {
        return default_averages();
    };
    match read_dataset_csv(path) {
        Ok(rows) if !rows.is_empty() => district_averages(&rows),
        Ok(_) => {
            tracing::warn!("{} has no rows, using default district averages", path.display());
            default_averages()
        },
        Err(e) => {
            tracing::warn!("Could not read district averages ({e}), using defaults");
            default_averages()
        },
    }
}

/// District averages plus the caller's estimate as the last bar.
pub fn comparison_bars(
    averages: &BTreeMap<String, f64>,
    district: &str,
    rent: f64,
) -> Vec<(String, f64)> {
    let mut bars: Vec<(String, f64)> = averages.iter().map(|(d, v)| (d.clone(), *v)).collect();
    bars.push((format!("Your ({district})"), rent));
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{sample_rows, write_dataset_csv};

    #[test]
    fn test_sample_averages() {
        let avg = district_averages(&sample_rows());
        assert_eq!(avg["Gasabo"], 625_000.);
        assert_eq!(avg["Kicukiro"], 350_000.);
        assert_eq!(avg["Nyarugenge"], 750_000.);
    }

    #[test]
    fn test_averages_round() {
        let rows = vec![
            RentalRow::new("Gasabo", "Villa", 1, 1, "Garden", 100_000.),
            RentalRow::new("Gasabo", "Villa", 1, 1, "Garden", 100_001.),
        ];
        assert_eq!(district_averages(&rows)["Gasabo"], 100_001.);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_averages(Some(&dir.path().join("none.csv"))), default_averages());
        assert_eq!(load_averages(None)["Kicukiro"], 420_000.);
    }

    #[test]
    fn test_file_averages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample_houses.csv");
        write_dataset_csv(&path, &sample_rows()).unwrap();
        assert_eq!(load_averages(Some(&path))["Gasabo"], 625_000.);
    }

    #[test]
    fn test_estimate_is_last_bar() {
        let bars = comparison_bars(&default_averages(), "Kicukiro", 510_000.);
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0], ("Gasabo".to_string(), 450_000.));
        assert_eq!(bars[3], ("Your (Kicukiro)".to_string(), 510_000.));
    }
}
