//! Rent affordability from gross income and existing debt.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

/// Common guideline: rent at most 30% of gross monthly income.
pub const DEFAULT_RENT_TO_INCOME: Decimal = dec!(0.30);
/// Lender-style ceiling on rent plus other debt payments.
pub const DEFAULT_MAX_DEBT_TO_INCOME: Decimal = dec!(0.36);
/// Landlords often require annual income of 40 times the monthly rent.
pub const LANDLORD_INCOME_MULTIPLE: Decimal = dec!(40);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentAffordabilityInput {
    pub annual_income: Money,
    #[serde(default)]
    pub monthly_debt_payments: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_to_income_ratio: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_debt_to_income: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_rent: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingRule {
    RentToIncome,
    DebtToIncome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentAffordabilityOutput {
    pub monthly_income: Money,
    pub income_rule_rent: Money,
    /// Room left under the debt-to-income ceiling after existing debts
    pub debt_rule_rent: Money,
    pub recommended_monthly_rent: Money,
    pub binding_rule: BindingRule,
    pub landlord_max_rent: Money,
    pub remaining_income: Money,
    pub rent_to_income: Rate,
    pub debt_to_income: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_rent_affordable: Option<bool>,
}

pub fn validate_rent_affordability(input: &RentAffordabilityInput) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Annual income", input.annual_income)
        .non_negative("Monthly debt payments", input.monthly_debt_payments);
    if let Some(ratio) = input.rent_to_income_ratio {
        v.range("Rent-to-income ratio", ratio, dec!(0), dec!(1));
    }
    if let Some(dti) = input.max_debt_to_income {
        v.range("Debt-to-income ratio", dti, dec!(0), dec!(1));
    }
    if let Some(rent) = input.desired_rent {
        v.non_negative("Desired rent", rent);
    }
    v.finish()
}

/// Rent supported by income under the 30% and debt-to-income guidelines.
pub fn calculate_rent_affordability(
    input: &RentAffordabilityInput,
) -> FinCalcResult<ComputationOutput<RentAffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_rent_affordability(input))?;

    let ratio = input.rent_to_income_ratio.unwrap_or(DEFAULT_RENT_TO_INCOME);
    let dti = input.max_debt_to_income.unwrap_or(DEFAULT_MAX_DEBT_TO_INCOME);
    let monthly_income = input.annual_income / dec!(12);
    let debts = input.monthly_debt_payments;

    let income_rule_rent = monthly_income * ratio;
    let debt_rule_rent = (monthly_income * dti - debts).max(Decimal::ZERO);
    let (recommended, binding_rule) = if debt_rule_rent < income_rule_rent {
        (debt_rule_rent, BindingRule::DebtToIncome)
    } else {
        (income_rule_rent, BindingRule::RentToIncome)
    };

    log::debug!("rent: income rule {income_rule_rent}, debt rule {debt_rule_rent}");

    if debt_rule_rent.is_zero() {
        warnings.push(format!(
            "Existing debt payments of {debts} already exceed the {}% debt-to-income limit",
            (dti * dec!(100)).normalize()
        ));
    }

    // Figures below describe the rent actually planned for
    let rent = input.desired_rent.unwrap_or(recommended);
    let remaining_income = monthly_income - rent - debts;
    let desired_rent_affordable = input.desired_rent.map(|r| r <= recommended);
    if desired_rent_affordable == Some(false) {
        warnings.push(format!(
            "Desired rent of {rent} exceeds the recommended {recommended}"
        ));
    }

    let output = RentAffordabilityOutput {
        monthly_income,
        income_rule_rent,
        debt_rule_rent,
        recommended_monthly_rent: recommended,
        binding_rule,
        landlord_max_rent: input.annual_income / LANDLORD_INCOME_MULTIPLE,
        remaining_income,
        rent_to_income: rent / monthly_income,
        debt_to_income: (rent + debts) / monthly_income,
        desired_rent_affordable,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rent Affordability (rent-to-income and debt-to-income guidelines)",
        &serde_json::json!({
            "rent_to_income_ratio": ratio.to_string(),
            "max_debt_to_income": dti.to_string(),
            "landlord_income_multiple": LANDLORD_INCOME_MULTIPLE.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income(annual: Money, debts: Money) -> RentAffordabilityInput {
        RentAffordabilityInput {
            annual_income: annual,
            monthly_debt_payments: debts,
            rent_to_income_ratio: None,
            max_debt_to_income: None,
            desired_rent: None,
        }
    }

    #[test]
    fn test_income_rule_binds_without_debt() {
        let out = calculate_rent_affordability(&income(dec!(60_000), Decimal::ZERO))
            .unwrap()
            .result;
        assert_eq!(out.monthly_income, dec!(5_000));
        assert_eq!(out.recommended_monthly_rent, dec!(1_500));
        assert_eq!(out.binding_rule, BindingRule::RentToIncome);
        assert_eq!(out.landlord_max_rent, dec!(1_500));
        assert_eq!(out.remaining_income, dec!(3_500));
    }

    #[test]
    fn test_debt_rule_binds_with_heavy_debt() {
        let out = calculate_rent_affordability(&income(dec!(60_000), dec!(800)))
            .unwrap()
            .result;
        // 36% of 5,000 = 1,800 less 800 of debt
        assert_eq!(out.debt_rule_rent, dec!(1_000));
        assert_eq!(out.recommended_monthly_rent, dec!(1_000));
        assert_eq!(out.binding_rule, BindingRule::DebtToIncome);
    }

    #[test]
    fn test_debt_above_limit_floors_at_zero() {
        let out = calculate_rent_affordability(&income(dec!(36_000), dec!(2_000))).unwrap();
        assert_eq!(out.result.recommended_monthly_rent, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_desired_rent_check() {
        let mut input = income(dec!(90_000), dec!(200));
        input.desired_rent = Some(dec!(2_500));
        let out = calculate_rent_affordability(&input).unwrap();
        assert_eq!(out.result.desired_rent_affordable, Some(false));
        assert_eq!(out.result.remaining_income, dec!(4_800));
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_validation() {
        let mut input = income(Decimal::ZERO, dec!(-1));
        input.rent_to_income_ratio = Some(dec!(1.5));
        assert_eq!(validate_rent_affordability(&input).len(), 3);
    }
}
