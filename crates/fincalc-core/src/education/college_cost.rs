//! College savings: projected cost of attendance and the contribution needed
//! to fund it.
//!
//! Tuition inflates every year until and through enrollment. Savings earn
//! the expected return throughout; each college year's cost is withdrawn at
//! the start of that year.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::{compound, sinking_fund_payment};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeCostInput {
    /// Today's annual cost of attendance
    pub current_annual_cost: Money,
    pub years_until_college: u32,
    pub years_in_college: u32,
    pub cost_inflation: Rate,
    #[serde(default)]
    pub current_savings: Money,
    pub annual_return: Rate,
    /// Share of the cost to be paid from savings
    #[serde(default = "default_share")]
    pub share_funded: Rate,
}

fn default_share() -> Rate {
    Decimal::ONE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollegePhase {
    Saving,
    Enrolled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeYear {
    /// Years from today, starting at 1
    pub year: u32,
    pub phase: CollegePhase,
    pub contribution: Money,
    /// Cost of attendance drawn from savings this year
    pub withdrawal: Money,
    pub growth: Money,
    pub ending_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeCostOutput {
    /// Inflated cost of each college year
    pub projected_annual_costs: Vec<Money>,
    pub total_projected_cost: Money,
    /// Savings needed at enrollment to cover the funded share
    pub funding_target: Money,
    /// Current savings grown to enrollment
    pub projected_savings: Money,
    pub shortfall: Money,
    pub annual_savings_needed: Money,
    pub monthly_savings_needed: Money,
    /// One deposit today that closes the shortfall instead
    pub lump_sum_needed_today: Money,
    pub fully_funded: bool,
    pub schedule: Vec<CollegeYear>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_college_cost(input: &CollegeCostInput) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Annual college cost", input.current_annual_cost)
        .range_u32("Years until college", input.years_until_college, 0, 30)
        .range_u32("Years of college", input.years_in_college, 1, 10)
        .range("College cost increase", input.cost_inflation, dec!(0), dec!(0.20))
        .non_negative("Current savings", input.current_savings)
        .range("Expected return", input.annual_return, dec!(-0.20), dec!(0.30))
        .range("Share of cost funded", input.share_funded, dec!(0), dec!(1));
    v.finish()
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project college costs and the savings plan that covers them.
pub fn calculate_college_cost(
    input: &CollegeCostInput,
) -> FinCalcResult<ComputationOutput<CollegeCostOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_college_cost(input))?;

    let y = input.years_until_college;
    let g = input.annual_return;

    let projected_annual_costs: Vec<Money> = (0..input.years_in_college)
        .map(|k| input.current_annual_cost * compound(input.cost_inflation, y + k))
        .collect();
    let total_projected_cost: Money = projected_annual_costs.iter().copied().sum();

    let funding_target: Money = projected_annual_costs
        .iter()
        .zip(0u32..)
        .map(|(cost, k)| *cost * input.share_funded / compound(g, k))
        .sum();

    let growth_to_enrollment = compound(g, y);
    let projected_savings = input.current_savings * growth_to_enrollment;
    let shortfall = (funding_target - projected_savings).max(Decimal::ZERO);
    let fully_funded = shortfall.is_zero();

    let (annual_savings_needed, monthly_savings_needed) = if y == 0 {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            sinking_fund_payment(shortfall, g, y),
            sinking_fund_payment(shortfall, g / dec!(12), y * 12),
        )
    };
    let lump_sum_needed_today = shortfall / growth_to_enrollment;

    if y == 0 && !fully_funded {
        warnings.push(format!(
            "College starts now; the shortfall of {shortfall} must be covered as a lump sum"
        ));
    }
    if fully_funded {
        warnings.push("Current savings already cover the funded share of college costs".into());
    }

    // Year-by-year balance with the annual contribution
    let mut schedule = Vec::with_capacity((y + input.years_in_college) as usize);
    let mut balance = input.current_savings;
    for year in 1..=y {
        let growth = balance * g;
        balance += growth + annual_savings_needed;
        schedule.push(CollegeYear {
            year,
            phase: CollegePhase::Saving,
            contribution: annual_savings_needed,
            withdrawal: Decimal::ZERO,
            growth,
            ending_balance: balance,
        });
    }
    for (k, cost) in (0u32..).zip(projected_annual_costs.iter()) {
        let contribution = if y == 0 && k == 0 {
            lump_sum_needed_today
        } else {
            Decimal::ZERO
        };
        let withdrawal = *cost * input.share_funded;
        balance += contribution - withdrawal;
        let growth = balance * g;
        balance += growth;
        schedule.push(CollegeYear {
            year: y + k + 1,
            phase: CollegePhase::Enrolled,
            contribution,
            withdrawal,
            growth,
            ending_balance: balance,
        });
    }

    log::debug!("college cost: target={funding_target} shortfall={shortfall} ending={balance}");

    let output = CollegeCostOutput {
        projected_annual_costs,
        total_projected_cost,
        funding_target,
        projected_savings,
        shortfall,
        annual_savings_needed,
        monthly_savings_needed,
        lump_sum_needed_today,
        fully_funded,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "College Cost (inflated cost of attendance, sinking-fund savings plan)",
        &serde_json::json!({
            "current_annual_cost": input.current_annual_cost.to_string(),
            "years_until_college": y,
            "years_in_college": input.years_in_college,
            "cost_inflation": input.cost_inflation.to_string(),
            "annual_return": g.to_string(),
            "share_funded": input.share_funded.to_string(),
            "withdrawals": "start of each college year",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> CollegeCostInput {
        CollegeCostInput {
            current_annual_cost: dec!(25_000),
            years_until_college: 10,
            years_in_college: 4,
            cost_inflation: dec!(0.05),
            current_savings: dec!(10_000),
            annual_return: dec!(0.06),
            share_funded: Decimal::ONE,
        }
    }

    #[test]
    fn test_flat_costs_divide_evenly() {
        let input = CollegeCostInput {
            current_annual_cost: dec!(10_000),
            years_until_college: 10,
            years_in_college: 4,
            cost_inflation: Decimal::ZERO,
            current_savings: Decimal::ZERO,
            annual_return: Decimal::ZERO,
            share_funded: Decimal::ONE,
        };
        let out = calculate_college_cost(&input).unwrap().result;
        assert_eq!(out.funding_target, dec!(40_000));
        assert_eq!(out.annual_savings_needed, dec!(4_000));
        assert!((out.monthly_savings_needed - dec!(333.33)).abs() < dec!(0.01));
        assert_eq!(out.schedule.last().unwrap().ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_costs_inflate_from_today() {
        let out = calculate_college_cost(&base_input()).unwrap().result;
        let expected_first = dec!(25_000) * compound(dec!(0.05), 10);
        assert_eq!(out.projected_annual_costs[0], expected_first);
        assert_eq!(out.projected_annual_costs.len(), 4);
        assert!(out.projected_annual_costs[3] > out.projected_annual_costs[0]);
    }

    #[test]
    fn test_plan_depletes_savings_at_graduation() {
        let out = calculate_college_cost(&base_input()).unwrap().result;
        assert!(out.annual_savings_needed > Decimal::ZERO);
        assert_eq!(out.schedule.len(), 14);
        let ending = out.schedule.last().unwrap().ending_balance;
        assert!(ending.abs() < dec!(0.0001), "ending={ending}");
    }

    #[test]
    fn test_half_share_halves_target() {
        let full = calculate_college_cost(&base_input()).unwrap().result;
        let mut input = base_input();
        input.share_funded = dec!(0.5);
        let half = calculate_college_cost(&input).unwrap().result;
        assert!((half.funding_target * dec!(2) - full.funding_target).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_enrolling_now_needs_lump_sum() {
        let mut input = base_input();
        input.years_until_college = 0;
        let out = calculate_college_cost(&input).unwrap();
        let result = &out.result;
        assert_eq!(result.annual_savings_needed, Decimal::ZERO);
        assert_eq!(result.lump_sum_needed_today, result.shortfall);
        assert!(result.schedule.last().unwrap().ending_balance.abs() < dec!(0.0001));
        assert!(out.warnings.iter().any(|w| w.contains("lump sum")));
    }

    #[test]
    fn test_surplus_when_fully_funded() {
        let mut input = base_input();
        input.current_savings = dec!(500_000);
        let out = calculate_college_cost(&input).unwrap().result;
        assert!(out.fully_funded);
        assert_eq!(out.shortfall, Decimal::ZERO);
        assert!(out.schedule.last().unwrap().ending_balance > Decimal::ZERO);
    }

    #[test]
    fn test_validation() {
        let mut input = base_input();
        input.years_until_college = 31;
        input.years_in_college = 0;
        input.share_funded = dec!(1.2);
        assert_eq!(validate_college_cost(&input).len(), 3);
    }
}
