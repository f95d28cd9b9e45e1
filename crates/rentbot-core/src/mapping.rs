use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Dense string -> code table for one categorical column.
///
/// Codes are assigned by sorting the distinct labels and enumerating them, so
/// `labels[code]` is always the label for `code`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryMapping {
    codes: BTreeMap<String, u32>,
    labels: Vec<String>,
}

impl CategoryMapping {
    /// Build a mapping from observed values. Duplicates collapse, order is lexicographic.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = values.into_iter().map(|v| v.as_ref().to_owned()).collect();
        labels.sort();
        labels.dedup();

        let codes = labels.iter().enumerate().map(|(i, l)| (l.clone(), i as u32)).collect();
        Self { codes, labels }
    }

    /// Rebuild a mapping from persisted `label -> code` pairs.
    ///
    /// Codes must be non-negative, unique and cover `0..len` with no gaps.
    pub fn from_codes(raw: &BTreeMap<String, i64>) -> Result<Self, String> {
        if raw.is_empty() {
            return Err("mapping is empty".to_owned());
        }
        let mut labels: Vec<Option<String>> = vec![None; raw.len()];
        let mut codes = BTreeMap::new();

        for (label, &code) in raw {
            if code < 0 {
                return Err(format!("negative code {code} for '{label}'"));
            }
            let idx = code as usize;
            if idx >= raw.len() {
                return Err(format!(
                    "code {code} for '{label}' is outside 0..{} (codes must be dense)",
                    raw.len()
                ));
            }
            if let Some(prev) = &labels[idx] {
                return Err(format!("code {code} used by both '{prev}' and '{label}'"));
            }
            labels[idx] = Some(label.clone());
            codes.insert(label.clone(), code as u32);
        }

        // dense + unique over len slots means every slot is filled
        let labels = labels.into_iter().flatten().collect();
        Ok(Self { codes, labels })
    }

    pub fn encode(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.labels.get(code as usize).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.codes.contains_key(label)
    }

    /// Labels in code order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Serialize for CategoryMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.codes.serialize(serializer)
    }
}

/// The three categorical columns a record is encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    District,
    HouseType,
    Amenity,
}

impl CategoryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryField::District => "district",
            CategoryField::HouseType => "house_type",
            CategoryField::Amenity => "amenity",
        }
    }
    pub fn all() -> &'static [CategoryField] {
        use CategoryField::*;
        &[District, HouseType, Amenity]
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key older mapping files use for the amenity column.
pub const LEGACY_AMENITY_KEY: &str = "main_amenity";

/// Category tables for every categorical column, as fitted by the trainer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Mappings {
    pub district: CategoryMapping,
    pub house_type: CategoryMapping,
    pub amenity: CategoryMapping,
}

impl Mappings {
    pub fn get(&self, field: &CategoryField) -> &CategoryMapping {
        match field {
            CategoryField::District => &self.district,
            CategoryField::HouseType => &self.house_type,
            CategoryField::Amenity => &self.amenity,
        }
    }

    /// Validate a persisted `field -> (label -> code)` document.
    ///
    /// Accepts `main_amenity` in place of `amenity` but never both, and rejects
    /// any other top-level key.
    pub fn from_raw(raw: BTreeMap<String, BTreeMap<String, i64>>) -> Result<Self, String> {
        let mut district = None;
        let mut house_type = None;
        let mut amenity = None;

        for (key, table) in &raw {
            let slot = match key.as_str() {
                "district" => &mut district,
                "house_type" => &mut house_type,
                "amenity" | LEGACY_AMENITY_KEY => {
                    if amenity.is_some() {
                        return Err(format!(
                            "both 'amenity' and '{LEGACY_AMENITY_KEY}' present, expected one"
                        ));
                    }
                    &mut amenity
                },
                other => return Err(format!("unexpected mapping key '{other}'")),
            };
            let mapping =
                CategoryMapping::from_codes(table).map_err(|e| format!("'{key}': {e}"))?;
            *slot = Some(mapping);
        }

        Ok(Self {
            district: district.ok_or("missing 'district' mapping")?,
            house_type: house_type.ok_or("missing 'house_type' mapping")?,
            amenity: amenity
                .ok_or(format!("missing 'amenity' (or '{LEGACY_AMENITY_KEY}') mapping"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
        entries.iter().map(|(l, c)| (l.to_string(), *c)).collect()
    }

    fn raw(entries: &[(&str, &[(&str, i64)])]) -> BTreeMap<String, BTreeMap<String, i64>> {
        entries
            .iter()
            .map(|(k, t)| (k.to_string(), t.iter().map(|(l, c)| (l.to_string(), *c)).collect()))
            .collect()
    }

    #[test]
    fn test_codes_follow_sorted_order() {
        let m = CategoryMapping::from_values(["Villa", "Apartment", "Bungalow", "Villa"]);
        assert_eq!(m.len(), 3);
        assert_eq!(m.encode("Apartment"), Some(0));
        assert_eq!(m.encode("Bungalow"), Some(1));
        assert_eq!(m.encode("Villa"), Some(2));
        assert_eq!(m.encode("Studio"), None);
    }

    #[test]
    fn test_decode_recovers_every_label() {
        let values = ["Nyarugenge", "Gasabo", "Kicukiro", "Gasabo"];
        let m = CategoryMapping::from_values(values);
        for v in values {
            let code = m.encode(v).unwrap();
            assert_eq!(m.decode(code), Some(v));
        }
        assert_eq!(m.decode(3), None);
    }

    #[test]
    fn test_from_codes_keeps_given_codes() {
        let m = CategoryMapping::from_codes(&table(&[("Balcony", 0), ("Parking", 1), ("Garden", 2)]))
            .unwrap();
        assert_eq!(m.encode("Garden"), Some(2));
        assert_eq!(m.labels(), &["Balcony", "Parking", "Garden"]);
    }

    #[test]
    fn test_from_codes_rejects_gaps_and_negatives() {
        assert!(CategoryMapping::from_codes(&table(&[("a", 0), ("b", 2)])).is_err());
        assert!(CategoryMapping::from_codes(&table(&[("--Select--", -1), ("a", 0)])).is_err());
        assert!(CategoryMapping::from_codes(&table(&[("a", 0), ("b", 0)])).is_err());
        assert!(CategoryMapping::from_codes(&table(&[])).is_err());
    }

    #[test]
    fn test_from_raw_accepts_legacy_amenity_key() {
        let doc = raw(&[
            ("district", &[("Gasabo", 0)]),
            ("house_type", &[("Villa", 0)]),
            ("main_amenity", &[("Garden", 0)]),
        ]);
        let m = Mappings::from_raw(doc).unwrap();
        assert_eq!(m.amenity.encode("Garden"), Some(0));
    }

    #[test]
    fn test_from_raw_rejects_both_amenity_keys() {
        let doc = raw(&[
            ("district", &[("Gasabo", 0)]),
            ("house_type", &[("Villa", 0)]),
            ("amenity", &[("Garden", 0)]),
            ("main_amenity", &[("Garden", 0)]),
        ]);
        assert!(Mappings::from_raw(doc).is_err());
    }

    #[test]
    fn test_from_raw_rejects_unknown_and_missing_keys() {
        let extra = raw(&[
            ("district", &[("Gasabo", 0)]),
            ("house_type", &[("Villa", 0)]),
            ("amenity", &[("Garden", 0)]),
            ("furnishing", &[("Yes", 0)]),
        ]);
        assert!(Mappings::from_raw(extra).is_err());

        let missing = raw(&[("district", &[("Gasabo", 0)]), ("amenity", &[("Garden", 0)])]);
        let err = Mappings::from_raw(missing).unwrap_err();
        assert!(err.contains("house_type"));
    }

    #[test]
    fn test_serializes_as_label_code_objects() {
        let m = Mappings {
            district: CategoryMapping::from_values(["Kicukiro", "Gasabo"]),
            house_type: CategoryMapping::from_values(["Villa"]),
            amenity: CategoryMapping::from_values(["Parking"]),
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["district"]["Gasabo"], 0);
        assert_eq!(json["district"]["Kicukiro"], 1);
        assert_eq!(json["amenity"]["Parking"], 0);
    }
}
