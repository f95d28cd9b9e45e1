use crate::mapping::CategoryField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for bedroom and bathroom counts accepted from users.
pub const MAX_ROOMS: u32 = 10;

/// Placeholder option shown first in every dropdown; never a real category.
pub const SELECT_PLACEHOLDER: &str = "--Select--";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing value for '{0}'")]
    MissingField(&'static str),
    #[error("unknown {field} '{value}'")]
    UnknownCategory { field: CategoryField, value: String },
    #[error("{field} must be between 0 and {max}, got {value}")]
    OutOfRange { field: &'static str, value: i64, max: u32 },
}

/// One validated property description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub district: String,
    pub house_type: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenity: String,
}

impl PropertyRecord {
    pub fn new(
        district: impl Into<String>,
        house_type: impl Into<String>,
        bedrooms: u32,
        bathrooms: u32,
        amenity: impl Into<String>,
    ) -> Self {
        Self {
            district: district.into(),
            house_type: house_type.into(),
            bedrooms,
            bathrooms,
            amenity: amenity.into(),
        }
    }

    pub fn category(&self, field: CategoryField) -> &str {
        match field {
            CategoryField::District => &self.district,
            CategoryField::HouseType => &self.house_type,
            CategoryField::Amenity => &self.amenity,
        }
    }

    /// Check the room counts against [`MAX_ROOMS`].
    pub fn check_bounds(&self) -> Result<(), ValidationError> {
        check_rooms("bedrooms", self.bedrooms as i64)?;
        check_rooms("bathrooms", self.bathrooms as i64)?;
        Ok(())
    }
}

impl fmt::Display for PropertyRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} bed, {} bath, {}",
            self.district, self.house_type, self.bedrooms, self.bathrooms, self.amenity
        )
    }
}

/// Raw form input where any field may still be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyForm {
    pub district: Option<String>,
    pub house_type: Option<String>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub amenity: Option<String>,
}

impl PropertyForm {
    /// Turn the form into a record, or report the first unset or out-of-range field.
    pub fn validate(&self) -> Result<PropertyRecord, ValidationError> {
        let district = selected("district", &self.district)?;
        let house_type = selected("house_type", &self.house_type)?;
        let bedrooms = self.bedrooms.ok_or(ValidationError::MissingField("bedrooms"))?;
        let bathrooms = self.bathrooms.ok_or(ValidationError::MissingField("bathrooms"))?;
        let amenity = selected("amenity", &self.amenity)?;

        Ok(PropertyRecord {
            district,
            house_type,
            bedrooms: check_rooms("bedrooms", bedrooms)?,
            bathrooms: check_rooms("bathrooms", bathrooms)?,
            amenity,
        })
    }
}

fn selected(field: &'static str, value: &Option<String>) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        None | Some("") | Some(SELECT_PLACEHOLDER) => Err(ValidationError::MissingField(field)),
        Some(v) => Ok(v.to_owned()),
    }
}

fn check_rooms(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    if (0..=MAX_ROOMS as i64).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ValidationError::OutOfRange { field, value, max: MAX_ROOMS })
    }
}
