use crate::dataset::RentalRow;
use crate::fallback::{self, AMENITY_PREMIUMS, DISTRICT_PREMIUMS, HOUSE_TYPE_PREMIUMS};
use crate::record::PropertyRecord;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Relative spread of the noise put on top of the rule-based rent.
pub const NOISE: f64 = 0.10;

fn pick<'a>(rng: &mut StdRng, table: &'a [(&'a str, f64)]) -> &'a str {
    table[rng.random_range(0..table.len())].0
}

/// Generate `n` listings priced by the fallback rule plus uniform noise.
///
/// Rents are rounded to the nearest 1000 RWF. The same seed always gives the same rows.
pub fn synth(n: usize, seed: u64) -> Vec<RentalRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);

    for _ in 0..n {
        let district = pick(&mut rng, DISTRICT_PREMIUMS);
        let house_type = pick(&mut rng, HOUSE_TYPE_PREMIUMS);
        let amenity = pick(&mut rng, AMENITY_PREMIUMS);
        let bedrooms: u32 = rng.random_range(1..=6);
        let bathrooms: u32 = rng.random_range(1..=bedrooms);

        let record = PropertyRecord::new(district, house_type, bedrooms, bathrooms, amenity);
        let noise = rng.random_range(-NOISE..=NOISE);
        let rent = (fallback::estimate(&record) * (1. + noise) / 1000.).round() * 1000.;

        rows.push(RentalRow::new(district, house_type, bedrooms, bathrooms, amenity, rent));
    }
    rows
}
