//! Sale price after discounts and sales tax.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::validation::{reject_findings, Validator};
use crate::FinCalcResult;

const MAX_SALES_TAX: Decimal = dec!(0.25);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiscountKind {
    /// Fraction of the list price (0.2 = 20% off)
    PercentOff(Rate),
    /// Flat amount off the list price
    AmountOff(Money),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountInput {
    pub list_price: Money,
    pub discount: DiscountKind,
    /// Further percent discounts, each applied to the already-reduced price
    #[serde(default)]
    pub additional_discounts: Vec<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_tax_rate: Option<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountStep {
    pub description: String,
    pub amount_off: Money,
    pub price_after: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountOutput {
    pub list_price: Money,
    pub final_price: Money,
    pub amount_saved: Money,
    /// Total saving as a share of the list price
    pub effective_discount_rate: Rate,
    pub sales_tax: Money,
    pub final_price_with_tax: Money,
    pub steps: Vec<DiscountStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRateOutput {
    pub list_price: Money,
    pub sale_price: Money,
    pub amount_saved: Money,
    pub discount_rate: Rate,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_discount(input: &DiscountInput) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Original price", input.list_price);

    match &input.discount {
        DiscountKind::PercentOff(rate) => {
            v.range("Discount", *rate, dec!(0), dec!(1));
        }
        DiscountKind::AmountOff(amount) => {
            v.non_negative("Discount amount", *amount).ensure(
                *amount <= input.list_price,
                "Discount amount cannot exceed the original price",
            );
        }
    }

    for (i, rate) in input.additional_discounts.iter().enumerate() {
        v.range(&format!("Additional discount {}", i + 1), *rate, dec!(0), dec!(1));
    }
    if let Some(tax) = input.sales_tax_rate {
        v.range("Sales tax", tax, dec!(0), MAX_SALES_TAX);
    }

    v.finish()
}

/// Range checks for [`solve_discount_rate`].
pub fn validate_discount_rate(list_price: Money, sale_price: Money) -> Vec<String> {
    let mut v = Validator::new();
    v.positive("Original price", list_price)
        .non_negative("Sale price", sale_price)
        .ensure(
            sale_price <= list_price,
            "Sale price cannot exceed the original price",
        );
    v.finish()
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

fn percent_label(rate: Rate) -> String {
    format!("{}% off", (rate * dec!(100)).normalize())
}

/// Apply the discount chain, then sales tax on the discounted price.
pub fn calculate_discount(input: &DiscountInput) -> FinCalcResult<ComputationOutput<DiscountOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    reject_findings(validate_discount(input))?;

    let mut price = input.list_price;
    let mut steps = Vec::with_capacity(1 + input.additional_discounts.len());

    let (label, first_off) = match &input.discount {
        DiscountKind::PercentOff(rate) => (percent_label(*rate), price * *rate),
        DiscountKind::AmountOff(amount) => (format!("{amount} off"), *amount),
    };
    price -= first_off;
    steps.push(DiscountStep {
        description: label,
        amount_off: first_off,
        price_after: price,
    });

    for rate in &input.additional_discounts {
        let off = price * *rate;
        price -= off;
        steps.push(DiscountStep {
            description: format!("extra {}", percent_label(*rate)),
            amount_off: off,
            price_after: price,
        });
    }

    if price.is_zero() {
        warnings.push("Discounts reduce the price to zero".into());
    }

    let amount_saved = input.list_price - price;
    log::debug!("discount: {} -> {price} over {} step(s)", input.list_price, steps.len());
    let sales_tax = price * input.sales_tax_rate.unwrap_or(Decimal::ZERO);

    let output = DiscountOutput {
        list_price: input.list_price,
        final_price: price,
        amount_saved,
        effective_discount_rate: amount_saved / input.list_price,
        sales_tax,
        final_price_with_tax: price + sales_tax,
        steps,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discount (sequential discounts, tax on discounted price)",
        &serde_json::json!({
            "list_price": input.list_price.to_string(),
            "discount": format!("{:?}", input.discount),
            "additional_discounts": input.additional_discounts.len(),
            "sales_tax_rate": input.sales_tax_rate.map(|t| t.to_string()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Percent off implied by a list price and a sale price.
pub fn solve_discount_rate(
    list_price: Money,
    sale_price: Money,
) -> FinCalcResult<ComputationOutput<DiscountRateOutput>> {
    let start = Instant::now();

    reject_findings(validate_discount_rate(list_price, sale_price))?;

    let amount_saved = list_price - sale_price;
    log::debug!("implied discount: {list_price} -> {sale_price}");
    let output = DiscountRateOutput {
        list_price,
        sale_price,
        amount_saved,
        discount_rate: amount_saved / list_price,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Implied Discount Rate",
        &serde_json::json!({
            "list_price": list_price.to_string(),
            "sale_price": sale_price.to_string(),
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
