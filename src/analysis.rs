//! Deal ROI analysis
//!
//! Pure arithmetic, no side effects: total investment is the purchase price
//! plus rehab and holding costs, net profit is ARV minus total investment,
//! ROI is net profit over total investment as a percentage.

use serde::Deserialize;

use crate::error::{Error, Result};

/// A numeric field as submitted over the wire: a JSON number or a numeric
/// string. The original clients send both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    fn resolve(&self, field: &str) -> Result<f64> {
        match self {
            NumericInput::Number(n) => Ok(*n),
            NumericInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidInput(format!("{} is not a number: {:?}", field, s))),
        }
    }
}

/// Inputs for the ROI calculation, as posted to `/api/analyze-property`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealInputs {
    pub purchase_price: Option<NumericInput>,
    pub rehab_cost: Option<NumericInput>,
    pub arv: Option<NumericInput>,
    pub holding_costs: Option<NumericInput>,
}

impl DealInputs {
    /// Resolve every field and compute the ROI percentage.
    pub fn roi(&self) -> Result<f64> {
        let purchase_price = resolve(&self.purchase_price, "purchasePrice")?;
        let rehab_cost = resolve(&self.rehab_cost, "rehabCost")?;
        let arv = resolve(&self.arv, "arv")?;
        let holding_costs = resolve(&self.holding_costs, "holdingCosts")?;
        calculate_roi(purchase_price, rehab_cost, arv, holding_costs)
    }
}

fn resolve(input: &Option<NumericInput>, field: &str) -> Result<f64> {
    input
        .as_ref()
        .ok_or_else(|| Error::InvalidInput(format!("missing field: {}", field)))?
        .resolve(field)
}

/// Compute the ROI percentage for a deal.
///
/// Errors with `DivisionByZero` when the total investment is zero instead of
/// returning infinity.
pub fn calculate_roi(
    purchase_price: f64,
    rehab_cost: f64,
    arv: f64,
    holding_costs: f64,
) -> Result<f64> {
    let total_investment = purchase_price + rehab_cost + holding_costs;
    if total_investment == 0.0 {
        return Err(Error::DivisionByZero);
    }
    let net_profit = arv - total_investment;
    Ok(net_profit / total_investment * 100.0)
}
