use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use fincalc_core::annuity::payout;
use fincalc_core::credit_card::payoff;
use fincalc_core::currency::conversion;
use fincalc_core::discount::pricing;
use fincalc_core::education::college_cost;
use fincalc_core::housing::rent_affordability;
use fincalc_core::lease::lease_payment;
use fincalc_core::payment::loan_payment;
use fincalc_core::retirement::k401;
use fincalc_core::FinCalcResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON input, run the calculator, and serialize its output.
fn run_json<I, O>(input_json: &str, calc: impl FnOnce(&I) -> FinCalcResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = calc(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Parse the JSON input and return the validation findings as a JSON array.
fn validate_json<I: DeserializeOwned>(
    input_json: &str,
    validate: impl FnOnce(&I) -> Vec<String>,
) -> NapiResult<String> {
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    serde_json::to_string(&validate(&input)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Payment / amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_loan_payment(input_json: String) -> NapiResult<String> {
    run_json(&input_json, loan_payment::calculate_loan_payment)
}

#[napi]
pub fn validate_loan_payment(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, loan_payment::validate_loan_payment)
}

// ---------------------------------------------------------------------------
// Annuity
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_annuity_payout(input_json: String) -> NapiResult<String> {
    run_json(&input_json, payout::calculate_annuity_payout)
}

#[napi]
pub fn validate_annuity_payout(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, payout::validate_annuity_payout)
}

// ---------------------------------------------------------------------------
// Lease
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_lease(input_json: String) -> NapiResult<String> {
    run_json(&input_json, lease_payment::calculate_lease)
}

#[napi]
pub fn validate_lease(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, lease_payment::validate_lease)
}

#[napi]
pub fn calculate_auto_lease(input_json: String) -> NapiResult<String> {
    run_json(&input_json, lease_payment::calculate_auto_lease)
}

#[napi]
pub fn validate_auto_lease(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, lease_payment::validate_auto_lease)
}

// ---------------------------------------------------------------------------
// Retirement
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_k401(input_json: String) -> NapiResult<String> {
    run_json(&input_json, k401::calculate_k401)
}

#[napi]
pub fn validate_k401(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, k401::validate_k401)
}

// ---------------------------------------------------------------------------
// Education
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_college_cost(input_json: String) -> NapiResult<String> {
    run_json(&input_json, college_cost::calculate_college_cost)
}

#[napi]
pub fn validate_college_cost(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, college_cost::validate_college_cost)
}

// ---------------------------------------------------------------------------
// Credit card
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_credit_card_payoff(input_json: String) -> NapiResult<String> {
    run_json(&input_json, payoff::calculate_credit_card_payoff)
}

#[napi]
pub fn validate_credit_card_payoff(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, payoff::validate_credit_card_payoff)
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

#[napi]
pub fn convert_currency(input_json: String) -> NapiResult<String> {
    run_json(&input_json, conversion::convert_currency)
}

#[napi]
pub fn validate_currency_conversion(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, conversion::validate_currency_conversion)
}

#[napi]
pub fn convert_to_many(input_json: String) -> NapiResult<String> {
    run_json(&input_json, conversion::convert_to_many)
}

#[napi]
pub fn validate_multi_conversion(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, conversion::validate_multi_conversion)
}

#[napi]
pub fn reference_rates() -> NapiResult<String> {
    serde_json::to_string(&serde_json::json!({
        "as_of": conversion::REFERENCE_RATES_AS_OF,
        "rates": conversion::reference_rates(),
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Discount
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_discount(input_json: String) -> NapiResult<String> {
    run_json(&input_json, pricing::calculate_discount)
}

#[napi]
pub fn validate_discount(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, pricing::validate_discount)
}

/// Decimal prices arrive as strings to keep full precision across the boundary.
fn parse_prices(list_price: &str, sale_price: &str) -> NapiResult<(Decimal, Decimal)> {
    let list: Decimal = list_price.parse().map_err(to_napi_error)?;
    let sale: Decimal = sale_price.parse().map_err(to_napi_error)?;
    Ok((list, sale))
}

#[napi]
pub fn solve_discount_rate(list_price: String, sale_price: String) -> NapiResult<String> {
    let (list, sale) = parse_prices(&list_price, &sale_price)?;
    let output = pricing::solve_discount_rate(list, sale).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_discount_rate(list_price: String, sale_price: String) -> NapiResult<String> {
    let (list, sale) = parse_prices(&list_price, &sale_price)?;
    serde_json::to_string(&pricing::validate_discount_rate(list, sale)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Housing
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_rent_affordability(input_json: String) -> NapiResult<String> {
    run_json(&input_json, rent_affordability::calculate_rent_affordability)
}

#[napi]
pub fn validate_rent_affordability(input_json: String) -> NapiResult<String> {
    validate_json(&input_json, rent_affordability::validate_rent_affordability)
}
