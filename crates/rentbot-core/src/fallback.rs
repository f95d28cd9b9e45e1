//! Rule-based rent estimate used when no trained model is available.

use crate::record::PropertyRecord;

pub const BASE_RENT: f64 = 300_000.;
pub const PER_BEDROOM: f64 = 40_000.;
pub const PER_BATHROOM: f64 = 30_000.;

pub const DISTRICT_PREMIUMS: &[(&str, f64)] =
    &[("Gasabo", 40_000.), ("Kicukiro", 20_000.), ("Nyarugenge", 80_000.)];

pub const HOUSE_TYPE_PREMIUMS: &[(&str, f64)] =
    &[("Apartment", 30_000.), ("Bungalow", 60_000.), ("Villa", 120_000.)];

pub const AMENITY_PREMIUMS: &[(&str, f64)] =
    &[("Balcony", 10_000.), ("Garden", 30_000.), ("Parking", 20_000.)];

// exact match, anything else adds nothing
fn premium(table: &[(&str, f64)], label: &str) -> f64 {
    table.iter().find(|(name, _)| *name == label).map_or(0., |(_, add)| *add)
}

/// Additive estimate: base plus district, house type, per-room and amenity increments.
pub fn estimate(record: &PropertyRecord) -> f64 {
    BASE_RENT
        + premium(DISTRICT_PREMIUMS, &record.district)
        + premium(HOUSE_TYPE_PREMIUMS, &record.house_type)
        + record.bedrooms as f64 * PER_BEDROOM
        + record.bathrooms as f64 * PER_BATHROOM
        + premium(AMENITY_PREMIUMS, &record.amenity)
}

/// Labels the rule recognizes, for populating choices when running without a model.
pub fn known_labels(table: &[(&str, f64)]) -> Vec<String> {
    table.iter().map(|(name, _)| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_villa_in_nyarugenge() {
        let rec = PropertyRecord::new("Nyarugenge", "Villa", 4, 3, "Parking");
        assert_eq!(estimate(&rec), 770_000.);
        assert_eq!(
            estimate(&rec),
            BASE_RENT + 80_000. + 120_000. + 4. * PER_BEDROOM + 3. * PER_BATHROOM + 20_000.
        );
    }

    #[test]
    fn test_unknown_labels_add_nothing() {
        let rec = PropertyRecord::new("Musanze", "Studio", 0, 0, "Pool");
        assert_eq!(estimate(&rec), BASE_RENT);
    }

    #[test]
    fn test_same_input_same_output() {
        let rec = PropertyRecord::new("Gasabo", "Apartment", 2, 1, "Balcony");
        assert_eq!(estimate(&rec).to_bits(), estimate(&rec).to_bits());
        assert_eq!(estimate(&rec), 490_000.);
    }

    #[test]
    fn test_monotone_in_rooms() {
        for beds in 0..10 {
            for baths in 0..10 {
                let lo = PropertyRecord::new("Kicukiro", "Bungalow", beds, baths, "Garden");
                let more_beds = PropertyRecord { bedrooms: beds + 1, ..lo.clone() };
                let more_baths = PropertyRecord { bathrooms: baths + 1, ..lo.clone() };
                assert!(estimate(&more_beds) >= estimate(&lo));
                assert!(estimate(&more_baths) >= estimate(&lo));
            }
        }
    }
}
