/// Currency utility functions.
///
/// All monetary values in the database are stored in kobo (1 Naira = 100 kobo)
/// to avoid floating-point precision issues.

/// Convert Naira to kobo (multiply by 100)
pub fn naira_to_kobo(naira: f64) -> i64 {
    (naira * 100.0).round() as i64
}

/// Convert kobo to Naira (divide by 100)
pub fn kobo_to_naira(kobo: i64) -> f64 {
    kobo as f64 / 100.0
}

/// Format kobo as Naira string with 2 decimal places
pub fn format_kobo_as_naira(kobo: i64) -> String {
    format!("₦{:.2}", kobo_to_naira(kobo))
}

/// Penalty owed for a violation, in kobo:
/// deposit-per-unit × quantity × penalty percentage / 100.
/// Integer division truncates sub-kobo remainders.
pub fn penalty_amount_kobo(deposit_per_unit: i64, quantity: i32, penalty_percentage: i32) -> i64 {
    deposit_per_unit
        .saturating_mul(quantity as i64)
        .saturating_mul(penalty_percentage as i64)
        / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naira_to_kobo() {
        assert_eq!(naira_to_kobo(100.0), 10000);
        assert_eq!(naira_to_kobo(0.50), 50);
        assert_eq!(naira_to_kobo(123.45), 12345);
    }

    #[test]
    fn test_kobo_to_naira() {
        assert_eq!(kobo_to_naira(10000), 100.0);
        assert_eq!(kobo_to_naira(50), 0.50);
        assert_eq!(kobo_to_naira(12345), 123.45);
    }

    #[test]
    fn test_format_kobo_as_naira() {
        assert_eq!(format_kobo_as_naira(10000), "₦100.00");
        assert_eq!(format_kobo_as_naira(50), "₦0.50");
    }

    #[test]
    fn test_penalty_amount_formula() {
        // deposit-per-unit 1,000,000 (in kobo), 1 unit, 30% -> 300,000
        assert_eq!(penalty_amount_kobo(1_000_000, 1, 30), 300_000);
        // multi-unit items multiply before the percentage
        assert_eq!(penalty_amount_kobo(50_000, 4, 25), 50_000);
        assert_eq!(penalty_amount_kobo(0, 10, 100), 0);
    }

    #[test]
    fn test_penalty_amount_full_percentage_sweep() {
        let deposit_per_unit: i64 = 250_000;
        let quantity: i32 = 3;
        for p in 0..=100 {
            let expected = deposit_per_unit * quantity as i64 * p as i64 / 100;
            assert_eq!(penalty_amount_kobo(deposit_per_unit, quantity, p), expected);
        }
    }

    #[test]
    fn test_penalty_amount_bounds() {
        // 0% is always zero, 100% is always the full deposit for the line
        assert_eq!(penalty_amount_kobo(750_000, 2, 0), 0);
        assert_eq!(penalty_amount_kobo(750_000, 2, 100), 1_500_000);
    }
}
