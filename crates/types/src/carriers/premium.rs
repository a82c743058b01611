//! Premium amounts
//!
//! Premiums are carried as an annual/monthly pair of two-decimal amounts in a
//! single currency, both derived from whichever figure the carrier reported.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

const MONTHS_PER_YEAR: u32 = 12;
const CURRENCY_SCALE: u32 = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PremiumError {
	#[error("Premium must be positive, got {value}")]
	NonPositive { value: Decimal },
}

/// Positive premium expressed both annually and monthly
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Premium {
	annual: Decimal,
	monthly: Decimal,
}

fn round_currency(value: Decimal) -> Decimal {
	value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointNearestEven)
}

fn ensure_positive(value: Decimal) -> Result<Decimal, PremiumError> {
	let rounded = round_currency(value);
	if rounded <= Decimal::ZERO {
		return Err(PremiumError::NonPositive { value });
	}
	Ok(rounded)
}

impl Premium {
	/// Build from an annual figure; the monthly amount is derived from it
	pub fn from_annual(annual: Decimal) -> Result<Self, PremiumError> {
		let annual = ensure_positive(annual)?;
		let monthly = ensure_positive(annual / Decimal::from(MONTHS_PER_YEAR))?;
		Ok(Self { annual, monthly })
	}

	/// Build from a monthly figure; the annual amount is derived from it
	pub fn from_monthly(monthly: Decimal) -> Result<Self, PremiumError> {
		let monthly = ensure_positive(monthly)?;
		let annual = round_currency(monthly * Decimal::from(MONTHS_PER_YEAR));
		Ok(Self { annual, monthly })
	}

	pub fn annual(&self) -> Decimal {
		self.annual
	}

	pub fn monthly(&self) -> Decimal {
		self.monthly
	}

	/// Annual amount as a float, for scoring arithmetic only
	pub fn annual_f64(&self) -> f64 {
		self.annual.to_f64().unwrap_or(f64::MAX)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn test_from_annual_derives_monthly() {
		let premium = Premium::from_annual(Decimal::from(1200)).unwrap();
		assert_eq!(premium.annual(), Decimal::from(1200));
		assert_eq!(premium.monthly(), Decimal::from(100));
	}

	#[test]
	fn test_from_monthly_derives_annual() {
		let premium = Premium::from_monthly(Decimal::from_str("112.505").unwrap()).unwrap();
		assert_eq!(premium.monthly(), Decimal::from_str("112.50").unwrap());
		assert_eq!(premium.annual(), Decimal::from_str("1350.00").unwrap());
	}

	#[test]
	fn test_non_positive_rejected() {
		assert!(Premium::from_annual(Decimal::ZERO).is_err());
		assert!(Premium::from_monthly(Decimal::from(-10)).is_err());
		// Rounds to zero at currency precision
		assert!(Premium::from_annual(Decimal::from_str("0.001").unwrap()).is_err());
	}

	#[test]
	fn test_serializes_both_figures() {
		let premium = Premium::from_annual(Decimal::from(1100)).unwrap();
		let json = serde_json::to_value(premium).unwrap();
		assert!(json.get("annual").is_some());
		assert!(json.get("monthly").is_some());
	}
}
