use crate::models::Grade;

use super::units::parse_measurement;

/// Parse the composite index (`khaiValue`). Same leniency as pollutant fields.
pub fn parse_index(raw: Option<&str>) -> Option<f64> {
    parse_measurement(raw)
}

/// Map a composite index onto a grade.
///
/// Ordered from the highest threshold down; anything that matches none of
/// the ranges (negative, NaN, missing) ends up `Unknown`.
pub fn classify(index: Option<f64>) -> Grade {
    let Some(value) = index else {
        return Grade::Unknown;
    };

    if value >= 201.0 {
        Grade::Poor
    } else if value >= 151.0 {
        Grade::Inferior
    } else if value >= 101.0 {
        Grade::Fair
    } else if value >= 51.0 {
        Grade::Good
    } else if value >= 0.0 {
        Grade::Excellent
    } else {
        Grade::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries() {
        assert_eq!(classify(Some(201.0)), Grade::Poor);
        assert_eq!(classify(Some(200.9)), Grade::Inferior);
        assert_eq!(classify(Some(151.0)), Grade::Inferior);
        assert_eq!(classify(Some(150.99)), Grade::Fair);
        assert_eq!(classify(Some(101.0)), Grade::Fair);
        assert_eq!(classify(Some(100.5)), Grade::Good);
        assert_eq!(classify(Some(51.0)), Grade::Good);
        assert_eq!(classify(Some(50.999)), Grade::Excellent);
        assert_eq!(classify(Some(0.0)), Grade::Excellent);
        assert_eq!(classify(Some(-1.0)), Grade::Unknown);
    }

    #[test]
    fn unclassifiable_falls_through() {
        assert_eq!(classify(None), Grade::Unknown);
        assert_eq!(classify(Some(f64::NAN)), Grade::Unknown);
        assert_eq!(classify(Some(f64::NEG_INFINITY)), Grade::Unknown);
        assert_eq!(classify(parse_index(Some("-"))), Grade::Unknown);
        assert_eq!(classify(parse_index(Some("abc"))), Grade::Unknown);
    }

    #[test]
    fn parses_reported_index() {
        assert_eq!(parse_index(Some("80")), Some(80.0));
        assert_eq!(classify(parse_index(Some("80"))), Grade::Good);
    }

    proptest! {
        #[test]
        fn ladder_matches_ranges(value in -500.0f64..1000.0f64) {
            let expected = if value >= 201.0 {
                Grade::Poor
            } else if (151.0..201.0).contains(&value) {
                Grade::Inferior
            } else if (101.0..151.0).contains(&value) {
                Grade::Fair
            } else if (51.0..101.0).contains(&value) {
                Grade::Good
            } else if (0.0..51.0).contains(&value) {
                Grade::Excellent
            } else {
                Grade::Unknown
            };
            prop_assert_eq!(classify(Some(value)), expected);
        }

        #[test]
        fn grades_never_decrease_with_index(a in 0.0f64..500.0, b in 0.0f64..500.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(Some(low)).characteristic_value() <= classify(Some(high)).characteristic_value());
        }
    }
}
