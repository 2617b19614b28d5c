//! Unit tests for monetary rounding and percentages
//!
//! Bills report every amount at 0.01 resolution with half-away-from-zero
//! rounding; these tests pin the behaviour at the midpoints.

use core_kernel::{checked_add, checked_mul, round_currency, ensure_non_negative, Percentage, MoneyError, CURRENCY_SCALE};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod rounding {
    use super::*;

    #[test]
    fn test_midpoint_rounds_up_for_positive_amounts() {
        assert_eq!(round_currency(dec!(1.005)), dec!(1.01));
        assert_eq!(round_currency(dec!(0.015)), dec!(0.02));
        assert_eq!(round_currency(dec!(0.025)), dec!(0.03));
    }

    #[test]
    fn test_midpoint_rounds_away_for_negative_amounts() {
        assert_eq!(round_currency(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_below_midpoint_rounds_down() {
        assert_eq!(round_currency(dec!(1.0049999)), dec!(1.00));
    }

    #[test]
    fn test_already_rounded_amount_is_unchanged() {
        assert_eq!(round_currency(dec!(18.80)), dec!(18.80));
        assert_eq!(round_currency(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_result_scale_never_exceeds_currency_scale() {
        let rounded = round_currency(dec!(12.3456789));
        assert!(rounded.scale() <= CURRENCY_SCALE);
        assert_eq!(rounded, dec!(12.35));
    }
}

mod percentages {
    use super::*;

    #[test]
    fn test_apply_vat() {
        let vat = Percentage::new(dec!(15));
        assert_eq!(vat.apply(dec!(12)), Ok(dec!(1.8)));
    }

    #[test]
    fn test_zero_percent() {
        assert_eq!(Percentage::zero().apply(dec!(999.99)), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_fractional_points() {
        let levy = Percentage::new(dec!(2.5));
        assert_eq!(levy.apply(dec!(200)), Ok(dec!(5)));
        assert_eq!(levy.as_fraction(), dec!(0.025));
    }

    #[test]
    fn test_display() {
        assert_eq!(Percentage::new(dec!(15.00)).to_string(), "15%");
        assert_eq!(Percentage::new(dec!(7.5)).to_string(), "7.5%");
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Percentage::new(dec!(15))).unwrap();
        assert_eq!(json, "\"15\"");
    }
}

mod validation {
    use super::*;

    #[test]
    fn test_negative_value_is_rejected_with_field_name() {
        let err = ensure_non_negative(dec!(-5), "fixed_service_charge").unwrap_err();
        assert_eq!(
            err,
            MoneyError::NegativeAmount {
                field: "fixed_service_charge".to_string(),
                value: dec!(-5),
            }
        );
    }

    #[test]
    fn test_zero_and_positive_pass_through() {
        assert_eq!(ensure_non_negative(dec!(0), "units").unwrap(), dec!(0));
        assert_eq!(ensure_non_negative(dec!(42.5), "units").unwrap(), dec!(42.5));
    }
}

mod overflow {
    use super::*;

    #[test]
    fn test_checked_mul_reports_the_quantity() {
        let err = checked_mul(Decimal::MAX, dec!(2), "subtotal").unwrap_err();
        assert_eq!(err, MoneyError::Overflow("subtotal".to_string()));
    }

    #[test]
    fn test_checked_add_at_the_limit() {
        assert!(checked_add(Decimal::MAX, dec!(1), "total").is_err());
        assert_eq!(checked_add(dec!(1.5), dec!(2.25), "total"), Ok(dec!(3.75)));
    }
}
