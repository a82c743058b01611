//! Raw applicant intake model
//!
//! Intake arrives from a web form or from the AI extraction collaborator.
//! Everything here is optional: presence checks happen in the risk extractor,
//! never at deserialization time.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod ai;

pub use ai::AiExtraction;

/// Insurance product line requested by the applicant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProductLine {
	Auto,
	Home,
	Life,
	Commercial,
}

impl ProductLine {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Auto => "auto",
			Self::Home => "home",
			Self::Life => "life",
			Self::Commercial => "commercial",
		}
	}
}

impl fmt::Display for ProductLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ProductLine {
	type Err = String;

	/// Accepts the canonical names plus the loose synonyms the chat
	/// collaborator tends to produce ("car", "homeowners", "business").
	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"auto" | "car" | "vehicle" | "motor" => Ok(Self::Auto),
			"home" | "homeowners" | "property" | "renters" => Ok(Self::Home),
			"life" | "term-life" | "term_life" => Ok(Self::Life),
			"commercial" | "business" => Ok(Self::Commercial),
			other => Err(format!("unknown product line '{}'", other)),
		}
	}
}

/// Self-reported credit band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CreditTier {
	Excellent,
	Good,
	Fair,
	Poor,
}

impl CreditTier {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Excellent => "excellent",
			Self::Good => "good",
			Self::Fair => "fair",
			Self::Poor => "poor",
		}
	}
}

/// Where the intake came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntakeSource {
	#[default]
	Form,
	AiExtraction,
}

/// Postal address; every field may be absent at intake time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
	pub street: Option<String>,
	pub city: Option<String>,
	/// Two-letter state code
	pub state: Option<String>,
	pub zip_code: Option<String>,
}

impl Address {
	/// Normalized (trimmed, upper-cased) state code, if one was given
	pub fn state_code(&self) -> Option<String> {
		self.state
			.as_deref()
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(str::to_ascii_uppercase)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleInfo {
	pub year: Option<u16>,
	pub make: Option<String>,
	pub model: Option<String>,
	pub annual_mileage: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyInfo {
	pub year_built: Option<u16>,
	pub square_feet: Option<u32>,
	pub construction: Option<String>,
	pub dwelling_value: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverageParams {
	pub liability_limit: Option<Decimal>,
	pub deductible: Option<Decimal>,
}

/// Free-form applicant intake as supplied by the UI or chat layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawApplicantData {
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub email: Option<String>,
	pub date_of_birth: Option<NaiveDate>,
	pub age: Option<u32>,
	pub address: Address,
	pub product_line: Option<ProductLine>,
	pub credit_tier: Option<CreditTier>,
	pub prior_claims: Option<u32>,
	pub vehicle: Option<VehicleInfo>,
	pub property: Option<PropertyInfo>,
	pub coverage: CoverageParams,
	pub effective_date: Option<NaiveDate>,
	pub source: IntakeSource,
}

impl RawApplicantData {
	/// Applicant age on `as_of`, preferring an explicit age over the date of birth
	pub fn age_on(&self, as_of: NaiveDate) -> Option<u32> {
		if let Some(age) = self.age {
			return Some(age);
		}

		let dob = self.date_of_birth?;
		if dob > as_of {
			return None;
		}

		let mut years = as_of.year() - dob.year();
		if (as_of.month(), as_of.day()) < (dob.month(), dob.day()) {
			years -= 1;
		}
		u32::try_from(years).ok()
	}
}
