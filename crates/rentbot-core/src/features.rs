use crate::mapping::{CategoryField, Mappings};
use crate::record::{PropertyRecord, ValidationError};

/// Column order the regression is fitted and evaluated in.
pub const FEATURE_COLUMNS: [&str; 5] = ["district", "house_type", "bedrooms", "bathrooms", "amenity"];

pub const N_FEATURES: usize = FEATURE_COLUMNS.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureVector {
    pub district: u32,
    pub house_type: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenity: u32,
}

impl FeatureVector {
    /// Encode a record with the fitted mappings.
    ///
    /// Unknown labels are rejected here so no placeholder code ever reaches a model.
    pub fn encode(record: &PropertyRecord, mappings: &Mappings) -> Result<Self, ValidationError> {
        let code = |field: CategoryField| {
            let value = record.category(field);
            mappings
                .get(&field)
                .encode(value)
                .ok_or_else(|| ValidationError::UnknownCategory { field, value: value.to_owned() })
        };

        Ok(Self {
            district: code(CategoryField::District)?,
            house_type: code(CategoryField::HouseType)?,
            bedrooms: record.bedrooms,
            bathrooms: record.bathrooms,
            amenity: code(CategoryField::Amenity)?,
        })
    }

    /// Values in [`FEATURE_COLUMNS`] order.
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.district as f64,
            self.house_type as f64,
            self.bedrooms as f64,
            self.bathrooms as f64,
            self.amenity as f64,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::CategoryMapping;

    fn mappings() -> Mappings {
        Mappings {
            district: CategoryMapping::from_values(["Gasabo", "Kicukiro", "Nyarugenge"]),
            house_type: CategoryMapping::from_values(["Apartment", "Bungalow", "Villa"]),
            amenity: CategoryMapping::from_values(["Balcony", "Garden", "Parking"]),
        }
    }

    #[test]
    fn test_columns_in_training_order() {
        let rec = PropertyRecord::new("Nyarugenge", "Bungalow", 3, 2, "Parking");
        let fv = FeatureVector::encode(&rec, &mappings()).unwrap();
        assert_eq!(fv.to_array(), [2., 1., 3., 2., 2.]);
    }

    #[test]
    fn test_unknown_category_is_validation_error() {
        let rec = PropertyRecord::new("Gasabo", "Studio", 1, 1, "Balcony");
        let err = FeatureVector::encode(&rec, &mappings()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownCategory {
                field: CategoryField::HouseType,
                value: "Studio".to_owned()
            }
        );
    }
}
