//! Currency and date formatting for exports.
//!
//! Output matches `Intl.NumberFormat('en-IN', { style: 'currency', currency: 'INR' })`
//! byte-for-byte for the values a cash book can hold.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

const RUPEE: char = '₹';

/// Format `value` as Indian rupees: two decimals, lakh/crore digit grouping.
pub fn format_inr(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    rounded.set_sign_positive(true);
    rounded.rescale(2);
    let digits = rounded.to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }
    out.push(RUPEE);
    out.push_str(&group_indian(int_part));
    out.push('.');
    out.push_str(frac_part);
    out
}

/// Short `en-IN` date: day/month/year without zero padding.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// `1234567` → `12,34,567`: last three digits, then pairs.
fn group_indian(int_part: &str) -> String {
    if int_part.len() <= 3 {
        return int_part.to_string();
    }

    let (head, tail) = int_part.split_at(int_part.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    let mut out = groups.join(",");
    out.push(',');
    out.push_str(tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(mantissa: i64, scale: u32) -> String {
        format_inr(Decimal::new(mantissa, scale))
    }

    #[test]
    fn small_values() {
        assert_eq!(inr(0, 0), "₹0.00");
        assert_eq!(inr(5, 0), "₹5.00");
        assert_eq!(inr(999, 0), "₹999.00");
        assert_eq!(inr(1050, 2), "₹10.50");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(inr(1000, 0), "₹1,000.00");
        assert_eq!(inr(12345, 0), "₹12,345.00");
        assert_eq!(inr(123456, 0), "₹1,23,456.00");
        assert_eq!(inr(1234567, 0), "₹12,34,567.00");
        assert_eq!(inr(12345678978, 2), "₹12,34,56,789.78");
    }

    #[test]
    fn negatives_carry_leading_minus() {
        assert_eq!(inr(-80, 0), "-₹80.00");
        assert_eq!(inr(-123450, 2), "-₹1,234.50");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(inr(1005, 3), "₹1.01");
        assert_eq!(inr(-1005, 3), "-₹1.01");
        assert_eq!(inr(1004, 3), "₹1.00");
    }

    #[test]
    fn negative_that_rounds_to_zero_has_no_sign() {
        assert_eq!(inr(-1, 3), "₹0.00");
    }

    #[test]
    fn dates_are_unpadded_day_month_year() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(format_date(d), "3/1/2024");
        let d = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(format_date(d), "25/12/2024");
    }
}
