use crate::dataset::RentalRow;
use crate::features::FeatureVector;
use crate::mapping::{CategoryMapping, Mappings};
use crate::model::TrainedModel;
use crate::record::PropertyRecord;
use crate::stats::stats::{r2_from_predictions, rmse};
use crate::stats::{FitError, Ols};

#[derive(thiserror::Error, Debug)]
pub enum TrainError {
    #[error("no training rows")]
    EmptyDataset,
    #[error("row {row}: rent is not a finite number")]
    NonFiniteTarget { row: usize },
    #[error("row {row}: {reason}")]
    Encode { row: usize, reason: String },
    #[error("regression failed: {0}")]
    Fit(#[from] FitError),
}

/// Derive the category tables and fit the rent regression.
///
/// Category codes come from the sorted distinct values of each column, then
/// every row is encoded in [`crate::features::FEATURE_COLUMNS`] order.
pub fn train(rows: &[RentalRow]) -> Result<(TrainedModel, Mappings), TrainError> {
    if rows.is_empty() {
        return Err(TrainError::EmptyDataset);
    }
    if let Some(row) = rows.iter().position(|r| !r.rent.is_finite()) {
        return Err(TrainError::NonFiniteTarget { row });
    }

    let mappings = Mappings {
        district: CategoryMapping::from_values(rows.iter().map(|r| &r.district)),
        house_type: CategoryMapping::from_values(rows.iter().map(|r| &r.house_type)),
        amenity: CategoryMapping::from_values(rows.iter().map(|r| &r.amenity)),
    };

    let mut x = Vec::with_capacity(rows.len());
    let mut y = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let record = PropertyRecord::new(
            &row.district,
            &row.house_type,
            row.bedrooms,
            row.bathrooms,
            &row.amenity,
        );
        let features = FeatureVector::encode(&record, &mappings)
            .map_err(|e| TrainError::Encode { row: i, reason: e.to_string() })?;
        x.push(features.to_array().to_vec());
        y.push(row.rent);
    }

    let fit = Ols::train(&x, &y)?;
    let y_hat: Vec<f64> = x.iter().map(|xi| fit.calculate(xi)).collect();
    let r2 = r2_from_predictions(&y, &y_hat);
    let err = rmse(&y, &y_hat);

    let model = TrainedModel::new(fit, rows.len(), r2, err);
    tracing::info!(
        rows = rows.len(),
        districts = mappings.district.len(),
        house_types = mappings.house_type.len(),
        amenities = mappings.amenity.len(),
        "Trained rent model: {}",
        model
    );

    Ok((model, mappings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_rows;

    #[test]
    fn test_sample_mappings_are_sorted() {
        let (_, m) = train(&sample_rows()).unwrap();
        assert_eq!(m.district.labels(), &["Gasabo", "Kicukiro", "Nyarugenge"]);
        assert_eq!(m.house_type.labels(), &["Apartment", "Bungalow", "Villa"]);
        assert_eq!(m.amenity.labels(), &["Balcony", "Garden", "Parking"]);
    }

    #[test]
    fn test_sample_fit_reproduces_training_rents() {
        // five rows, six parameters: the minimum norm fit interpolates
        let rows = sample_rows();
        let (model, m) = train(&rows).unwrap();
        for row in &rows {
            let rec = PropertyRecord::new(
                &row.district,
                &row.house_type,
                row.bedrooms,
                row.bathrooms,
                &row.amenity,
            );
            let fv = FeatureVector::encode(&rec, &m).unwrap();
            assert!((model.predict(&fv) - row.rent).abs() < 1e-3, "{rec}");
        }
        assert!(model.r2.unwrap() > 0.999_999);
        assert_eq!(model.n_samples, 5);
        assert!(model.check_schema().is_ok());
    }

    #[test]
    fn test_training_is_deterministic() {
        let (a, _) = train(&sample_rows()).unwrap();
        let (b, _) = train(&sample_rows()).unwrap();
        assert_eq!(a.fit, b.fit);
    }

    #[test]
    fn test_recovers_linear_rule() {
        // rent built from known weights over encoded columns
        let mut rows = Vec::new();
        let districts = ["Gasabo", "Kicukiro", "Nyarugenge"];
        let types = ["Apartment", "Bungalow", "Villa"];
        let amenities = ["Balcony", "Garden", "Parking"];
        for (d, district) in districts.iter().enumerate() {
            for (t, house_type) in types.iter().enumerate() {
                for beds in 1..4u32 {
                    let a = (beds as usize + d) % 3;
                    let baths = 1 + (beds + t as u32) % 2;
                    let rent = 200_000.
                        + 15_000. * d as f64
                        + 50_000. * t as f64
                        + 40_000. * beds as f64
                        + 25_000. * baths as f64
                        + 5_000. * a as f64;
                    rows.push(RentalRow::new(district, house_type, beds, baths, amenities[a], rent));
                }
            }
        }

        let (model, _) = train(&rows).unwrap();
        let expected = [15_000., 50_000., 40_000., 25_000., 5_000.];
        for (c, e) in model.fit.coefficients.iter().zip(expected) {
            assert!((c - e).abs() < 1e-4, "{c} vs {e}");
        }
        assert!((model.fit.intercept - 200_000.).abs() < 1e-3);
    }

    #[test]
    fn test_empty_dataset() {
        assert!(matches!(train(&[]), Err(TrainError::EmptyDataset)));
    }

    #[test]
    fn test_nan_rent() {
        let mut rows = sample_rows();
        rows[2].rent = f64::NAN;
        assert!(matches!(train(&rows), Err(TrainError::NonFiniteTarget { row: 2 })));
    }
}
