use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// One historical listing with its observed monthly rent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRow {
    pub district: String,
    pub house_type: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenity: String,
    pub rent: f64,
}

impl RentalRow {
    pub fn new(
        district: &str,
        house_type: &str,
        bedrooms: u32,
        bathrooms: u32,
        amenity: &str,
        rent: f64,
    ) -> Self {
        Self {
            district: district.to_owned(),
            house_type: house_type.to_owned(),
            bedrooms,
            bathrooms,
            amenity: amenity.to_owned(),
            rent,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("csv error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{path}: missing column '{column}'")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{path}, line {line}: {reason}")]
    Row { path: PathBuf, line: usize, reason: String },
}

/// Columns in file order, with the alternative header names older exports use.
const COLUMNS: [(&str, &[&str]); 6] = [
    ("district", &["district", "location"]),
    ("house_type", &["house_type", "housetype", "category"]),
    ("bedrooms", &["bedrooms"]),
    ("bathrooms", &["bathrooms"]),
    ("amenity", &["amenity", "main_amenity"]),
    ("rent", &["rent", "rent_rwf"]),
];

/// The five listings the demo model is trained on when no data file is given.
pub fn sample_rows() -> Vec<RentalRow> {
    vec![
        RentalRow::new("Gasabo", "Apartment", 2, 1, "Balcony", 350_000.),
        RentalRow::new("Kicukiro", "Bungalow", 3, 2, "Parking", 450_000.),
        RentalRow::new("Nyarugenge", "Villa", 4, 3, "Garden", 750_000.),
        RentalRow::new("Gasabo", "Villa", 5, 4, "Parking", 900_000.),
        RentalRow::new("Kicukiro", "Apartment", 1, 1, "Balcony", 250_000.),
    ]
}

pub fn read_dataset_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<RentalRow>, DatasetError> {
    let path = file_path.as_ref().to_path_buf();
    let file = File::open(&path).map_err(|source| DatasetError::Io { path: path.clone(), source })?;
    read_dataset(file, &path)
}

/// Read rows from any CSV source; `path` only labels errors.
pub fn read_dataset<R: std::io::Read>(
    reader: R,
    path: &Path,
) -> Result<Vec<RentalRow>, DatasetError> {
    let path = path.to_path_buf();
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);

    let header = rdr.headers().map_err(|source| DatasetError::Csv { path: path.clone(), source })?;
    let names: Vec<String> = header.iter().map(|h| h.trim().to_ascii_lowercase()).collect();

    let mut idx = [0usize; 6];
    for (slot, (column, aliases)) in idx.iter_mut().zip(COLUMNS) {
        *slot = names
            .iter()
            .position(|n| aliases.contains(&n.as_str()))
            .ok_or_else(|| DatasetError::MissingColumn { path: path.clone(), column })?;
    }

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // header is line 1
        let line = i + 2;
        let row_err = |reason: String| DatasetError::Row { path: path.clone(), line, reason };
        let record = result.map_err(|e| row_err(e.to_string()))?;

        let field = |n: usize| -> Result<String, DatasetError> {
            let (column, _) = COLUMNS[n];
            record
                .get(idx[n])
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| row_err(format!("missing {column}")))
        };
        let count = |n: usize| -> Result<u32, DatasetError> {
            let (column, _) = COLUMNS[n];
            field(n)?.parse().map_err(|e| row_err(format!("invalid {column}: {e}")))
        };

        let rent: f64 =
            field(5)?.parse().map_err(|e| row_err(format!("invalid rent: {e}")))?;
        if !rent.is_finite() {
            return Err(row_err(format!("rent is not a finite number: {rent}")));
        }

        rows.push(RentalRow {
            district: field(0)?,
            house_type: field(1)?,
            bedrooms: count(2)?,
            bathrooms: count(3)?,
            amenity: field(4)?,
            rent,
        });
    }

    Ok(rows)
}

/// Read and concatenate several data files in the order given.
pub fn read_datasets(paths: &[PathBuf]) -> Result<Vec<RentalRow>, DatasetError> {
    let mut rows = Vec::new();
    for path in paths {
        let mut file_rows = read_dataset_csv(path)?;
        tracing::info!("Read {} rows from {}", file_rows.len(), path.display());
        rows.append(&mut file_rows);
    }
    Ok(rows)
}

pub fn write_dataset_csv<P: AsRef<Path>>(
    file_path: P,
    rows: &[RentalRow],
) -> Result<(), DatasetError> {
    let path = file_path.as_ref().to_path_buf();
    let csv_err = |source| DatasetError::Csv { path: path.clone(), source };

    let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| DatasetError::Io { path: path.clone(), source })?;
    Ok(())
}
