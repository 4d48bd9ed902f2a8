//! 401(k) accumulation and retirement income.
//!
//! Each working year the employee defers a share of salary (capped at the
//! IRS elective deferral limit, plus the catch-up allowance from age 50), the
//! employer matches in tiers, and the combined contribution is deposited in
//! twelve monthly installments compounding at the expected return. At
//! retirement the balance is paid out as a level monthly annuity until life
//! expectancy.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{annuity_payment, compound};
use crate::types::{with_metadata, ComputationOutput, Money, PaymentTiming, Rate};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// IRS elective deferral limit (2024).
pub const EMPLOYEE_DEFERRAL_LIMIT: Decimal = dec!(23_000);
/// Additional catch-up deferral allowed from `CATCH_UP_AGE`.
pub const CATCH_UP_LIMIT: Decimal = dec!(7_500);
pub const CATCH_UP_AGE: u32 = 50;

const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 120;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One slice of an employer match formula.
///
/// Tiers are applied in order, each covering the next `up_to_salary_pct` of
/// salary: "100% of the first 3%, 50% of the next 2%" is
/// `[{1.0, 0.03}, {0.5, 0.02}]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTier {
    /// Employer dollars per employee dollar (0.5 = 50 cents on the dollar)
    pub match_rate: Rate,
    /// Width of the salary slice this tier matches
    pub up_to_salary_pct: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K401Input {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub annual_salary: Money,
    #[serde(default)]
    pub current_balance: Money,
    /// Employee deferral as a share of salary
    pub contribution_rate: Rate,
    #[serde(default)]
    pub employer_match: Vec<MatchTier>,
    #[serde(default)]
    pub salary_growth_rate: Rate,
    pub annual_return: Rate,
    #[serde(default)]
    pub inflation_rate: Rate,
    /// Replaces `EMPLOYEE_DEFERRAL_LIMIT` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_limit: Option<Money>,
    #[serde(default = "default_catch_up")]
    pub catch_up_eligible: bool,
}

fn default_catch_up() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K401Output {
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    pub balance_at_retirement: Money,
    /// Balance at retirement in today's dollars
    pub real_balance_at_retirement: Money,
    pub total_employee_contributions: Money,
    pub total_employer_contributions: Money,
    pub total_investment_growth: Money,
    /// Level monthly withdrawal that exhausts the balance at life expectancy
    pub monthly_retirement_income: Money,
    pub real_monthly_retirement_income: Money,
    /// The requested deferral exceeded the IRS limit in at least one year
    pub limit_applied: bool,
    pub year_by_year: Vec<K401Year>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K401Year {
    /// Age during the contribution year
    pub age: u32,
    pub salary: Money,
    pub employee_contribution: Money,
    pub employer_contribution: Money,
    pub investment_growth: Money,
    pub ending_balance: Money,
    pub real_balance: Money,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deferral limit applicable at `age`.
pub fn deferral_limit(age: u32, base_limit: Money, catch_up_eligible: bool) -> Money {
    if catch_up_eligible && age >= CATCH_UP_AGE {
        base_limit + CATCH_UP_LIMIT
    } else {
        base_limit
    }
}

/// Employer match on an (already capped) employee contribution.
pub fn employer_match(salary: Money, employee_contribution: Money, tiers: &[MatchTier]) -> Money {
    let mut unmatched = employee_contribution;
    let mut matched = Decimal::ZERO;

    for tier in tiers {
        if unmatched <= Decimal::ZERO {
            break;
        }
        let eligible = unmatched.min(salary * tier.up_to_salary_pct);
        matched += eligible * tier.match_rate;
        unmatched -= eligible;
    }

    matched
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_k401(input: &K401Input) -> Vec<String> {
    let mut v = Validator::new();
    v.range_u32("Current age", input.current_age, MIN_AGE, MAX_AGE)
        .range_u32("Retirement age", input.retirement_age, MIN_AGE, MAX_AGE)
        .range_u32("Life expectancy", input.life_expectancy, MIN_AGE, MAX_AGE)
        .ensure(
            input.current_age < input.retirement_age,
            "Retirement age must be greater than current age",
        )
        .ensure(
            input.retirement_age <= input.life_expectancy,
            "Life expectancy must be at least the retirement age",
        )
        .non_negative("Annual salary", input.annual_salary)
        .non_negative("Current 401(k) balance", input.current_balance)
        .range("Contribution rate", input.contribution_rate, dec!(0), dec!(1))
        .range("Salary increase", input.salary_growth_rate, dec!(-0.20), dec!(0.20))
        .range("Expected return", input.annual_return, dec!(-0.50), dec!(0.50))
        .range("Inflation", input.inflation_rate, dec!(0), dec!(0.20));

    for (i, tier) in input.employer_match.iter().enumerate() {
        let n = i + 1;
        v.range(&format!("Employer match rate (tier {n})"), tier.match_rate, dec!(0), dec!(2))
            .range(
                &format!("Employer match limit (tier {n})"),
                tier.up_to_salary_pct,
                dec!(0),
                dec!(1),
            );
    }

    if let Some(limit) = input.contribution_limit {
        v.positive("Contribution limit", limit);
    }

    v.finish()
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project a 401(k) balance to retirement and the income it supports.
pub fn calculate_k401(input: &K401Input) -> FinCalcResult<ComputationOutput<K401Output>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_k401(input))?;

    let years_to_retirement = input.retirement_age - input.current_age;
    let years_in_retirement = input.life_expectancy - input.retirement_age;
    let base_limit = input.contribution_limit.unwrap_or(EMPLOYEE_DEFERRAL_LIMIT);
    let monthly_rate = input.annual_return / dec!(12);
    let months = Decimal::from(12);

    let mut balance = input.current_balance;
    let mut total_employee = Decimal::ZERO;
    let mut total_employer = Decimal::ZERO;
    let mut total_growth = Decimal::ZERO;
    let mut limit_applied = false;
    let mut year_by_year = Vec::with_capacity(years_to_retirement as usize);

    for yr in 0..years_to_retirement {
        let age = input.current_age + yr;
        let salary = input.annual_salary * compound(input.salary_growth_rate, yr);

        let requested = salary * input.contribution_rate;
        let limit = deferral_limit(age, base_limit, input.catch_up_eligible);
        if requested > limit {
            limit_applied = true;
        }
        let employee = requested.min(limit);
        let employer = employer_match(salary, employee, &input.employer_match);

        let opening = balance;
        let deposit = (employee + employer) / months;
        for _ in 0..12 {
            balance = balance
                .checked_mul(Decimal::ONE + monthly_rate)
                .and_then(|b| b.checked_add(deposit))
                .ok_or_else(|| {
                    FinCalcError::FinancialImpossibility(format!(
                        "Projected balance at age {age} is outside the supported range"
                    ))
                })?;
        }
        let growth = balance - opening - employee - employer;

        total_employee += employee;
        total_employer += employer;
        total_growth += growth;

        year_by_year.push(K401Year {
            age,
            salary,
            employee_contribution: employee,
            employer_contribution: employer,
            investment_growth: growth,
            ending_balance: balance,
            real_balance: balance / compound(input.inflation_rate, yr + 1),
        });
    }

    if limit_applied {
        warnings.push(format!(
            "Employee contributions were capped at the annual deferral limit of {base_limit}"
        ));
    }

    let inflation_factor = compound(input.inflation_rate, years_to_retirement);
    let monthly_income = if years_in_retirement > 0 {
        annuity_payment(
            balance,
            monthly_rate,
            years_in_retirement * 12,
            PaymentTiming::End,
        )?
    } else {
        warnings.push("Retirement age equals life expectancy; no withdrawal period".into());
        Decimal::ZERO
    };

    log::debug!(
        "401(k): {years_to_retirement} years to retirement, balance at retirement {balance}"
    );

    let output = K401Output {
        years_to_retirement,
        years_in_retirement,
        balance_at_retirement: balance,
        real_balance_at_retirement: balance / inflation_factor,
        total_employee_contributions: total_employee,
        total_employer_contributions: total_employer,
        total_investment_growth: total_growth,
        monthly_retirement_income: monthly_income,
        real_monthly_retirement_income: monthly_income / inflation_factor,
        limit_applied,
        year_by_year,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "401(k) Projection (capped deferrals, tiered match, monthly compounding)",
        &serde_json::json!({
            "current_age": input.current_age,
            "retirement_age": input.retirement_age,
            "life_expectancy": input.life_expectancy,
            "deferral_limit": base_limit.to_string(),
            "catch_up_eligible": input.catch_up_eligible,
            "annual_return": input.annual_return.to_string(),
            "inflation_rate": input.inflation_rate.to_string(),
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

    fn default_input() -> K401Input {
        K401Input {
            current_age: 30,
            retirement_age: 65,
            life_expectancy: 85,
            annual_salary: dec!(80_000),
            current_balance: dec!(25_000),
            contribution_rate: dec!(0.10),
            employer_match: vec![MatchTier {
                match_rate: dec!(0.5),
                up_to_salary_pct: dec!(0.06),
            }],
            salary_growth_rate: dec!(0.03),
            annual_return: dec!(0.06),
            inflation_rate: dec!(0.025),
            contribution_limit: None,
            catch_up_eligible: true,
        }
    }

    #[test]
    fn test_two_tier_match() {
        let tiers = vec![
            MatchTier {
                match_rate: dec!(1.0),
                up_to_salary_pct: dec!(0.03),
            },
            MatchTier {
                match_rate: dec!(0.5),
                up_to_salary_pct: dec!(0.02),
            },
        ];
        // 6% of 100k: first 3k matched fully, next 2k at half, last 1k unmatched
        assert_eq!(employer_match(dec!(100_000), dec!(6_000), &tiers), dec!(4_000));
        // 2% of 100k: only the first tier applies
        assert_eq!(employer_match(dec!(100_000), dec!(2_000), &tiers), dec!(2_000));
    }

    #[test]
    fn test_contribution_never_exceeds_limit() {
        let mut input = default_input();
        input.annual_salary = dec!(400_000);
        input.contribution_rate = dec!(0.25);
        input.current_age = 45;
        let out = calculate_k401(&input).unwrap();

        assert!(out.result.limit_applied);
        assert!(!out.warnings.is_empty());
        for year in &out.result.year_by_year {
            let limit = deferral_limit(year.age, EMPLOYEE_DEFERRAL_LIMIT, true);
            assert!(year.employee_contribution <= limit);
        }
        assert_eq!(out.result.year_by_year[0].employee_contribution, dec!(23_000));
        // Age 50 unlocks the catch-up allowance
        let at_50 = out.result.year_by_year.iter().find(|y| y.age == 50).unwrap();
        assert_eq!(at_50.employee_contribution, dec!(30_500));
    }

    #[test]
    fn test_limit_override() {
        let mut input = default_input();
        input.contribution_rate = dec!(0.50);
        input.contribution_limit = Some(dec!(10_000));
        input.catch_up_eligible = false;
        let out = calculate_k401(&input).unwrap().result;
        assert!(out
            .year_by_year
            .iter()
            .all(|y| y.employee_contribution <= dec!(10_000)));
    }

    #[test]
    fn test_zero_return_sums_contributions() {
        let mut input = default_input();
        input.annual_return = Decimal::ZERO;
        input.salary_growth_rate = Decimal::ZERO;
        input.employer_match.clear();
        input.retirement_age = 40;
        let out = calculate_k401(&input).unwrap().result;

        // 10 years of 8,000 on top of 25,000
        assert!((out.balance_at_retirement - dec!(105_000)).abs() < dec!(0.000001));
        assert!(out.total_investment_growth.abs() < dec!(0.000001));
        // Zero return: the balance is spread evenly over 45 years of months
        assert_eq!(out.years_in_retirement, 45);
        assert!(
            (out.monthly_retirement_income - out.balance_at_retirement / dec!(540)).abs()
                < dec!(0.000001)
        );
    }

    #[test]
    fn test_totals_reconcile() {
        let out = calculate_k401(&default_input()).unwrap().result;
        let reconstructed = dec!(25_000)
            + out.total_employee_contributions
            + out.total_employer_contributions
            + out.total_investment_growth;
        assert!((reconstructed - out.balance_at_retirement).abs() < dec!(0.0001));
        assert_eq!(out.year_by_year.len(), 35);
        assert!(out.real_balance_at_retirement < out.balance_at_retirement);
        assert!(out.monthly_retirement_income > Decimal::ZERO);
    }

    #[test]
    fn test_extreme_growth_is_an_error() {
        let mut input = default_input();
        input.current_age = 18;
        input.retirement_age = 119;
        input.life_expectancy = 120;
        input.current_balance = crate::validation::MAX_AMOUNT;
        input.annual_return = dec!(0.5);
        assert!(validate_k401(&input).is_empty());
        let err = calculate_k401(&input).unwrap_err();
        assert!(matches!(err, FinCalcError::FinancialImpossibility(_)));
    }

    #[test]
    fn test_validation_rejects_bad_ages() {
        let mut input = default_input();
        input.current_age = 16;
        input.retirement_age = 15;
        let findings = validate_k401(&input);
        assert!(findings.iter().any(|f| f.contains("Current age")));
        assert!(findings.iter().any(|f| f.contains("Retirement age must be greater")));
        assert!(calculate_k401(&input).is_err());
    }
}
