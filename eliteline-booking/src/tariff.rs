/// Vehicle class the tariff falls back to for unknown classes.
pub const DEFAULT_VEHICLE: &str = "business";

/// Fixed per-class tariff in whole pounds.
const BASE_PRICES: &[(&str, i64)] = &[("business", 80), ("first", 120), ("xl", 150)];

pub fn price_for_vehicle(vehicle: &str) -> i64 {
    BASE_PRICES
        .iter()
        .find(|(class, _)| *class == vehicle)
        .or_else(|| BASE_PRICES.iter().find(|(class, _)| *class == DEFAULT_VEHICLE))
        .map(|(_, price)| *price)
        .expect("default vehicle class present in tariff")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tariff_by_class() {
        assert_eq!(price_for_vehicle("business"), 80);
        assert_eq!(price_for_vehicle("first"), 120);
        assert_eq!(price_for_vehicle("xl"), 150);
    }

    #[test]
    fn unknown_class_falls_back_to_business() {
        assert_eq!(price_for_vehicle("stretch-limo"), 80);
        assert_eq!(price_for_vehicle(""), 80);
    }
}
