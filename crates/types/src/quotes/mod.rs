//! Canonical quote request
//!
//! The carrier-agnostic request every adapter translates from. It is built
//! once per intake and shared read-only (behind an `Arc`) with all adapters.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applicant::{Address, CreditTier, ProductLine, PropertyInfo, VehicleInfo};

pub mod errors;

pub use errors::QuoteValidationError;

/// Result type for quote validation operations
pub type QuoteValidationResult<T> = Result<T, QuoteValidationError>;

/// Canonical field names used by carrier capability descriptors
pub mod fields {
	pub const PRODUCT_LINE: &str = "product_line";
	pub const FIRST_NAME: &str = "first_name";
	pub const LAST_NAME: &str = "last_name";
	pub const EMAIL: &str = "email";
	pub const AGE: &str = "age";
	pub const DATE_OF_BIRTH: &str = "date_of_birth";
	pub const CREDIT_TIER: &str = "credit_tier";
	pub const STREET: &str = "street";
	pub const CITY: &str = "city";
	pub const STATE: &str = "state";
	pub const ZIP_CODE: &str = "zip_code";
	pub const VEHICLE: &str = "vehicle";
	pub const PROPERTY: &str = "property";
	pub const COVERAGE_LIMIT: &str = "coverage_limit";
	pub const DEDUCTIBLE: &str = "deductible";
	pub const EFFECTIVE_DATE: &str = "effective_date";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub email: Option<String>,
	pub age: Option<u32>,
	pub date_of_birth: Option<NaiveDate>,
	pub credit_tier: Option<CreditTier>,
	pub prior_claims: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
	pub limit: Option<Decimal>,
	pub deductible: Option<Decimal>,
}

/// Canonical, carrier-agnostic quote request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
	pub request_id: String,
	pub product_line: ProductLine,
	pub applicant: Applicant,
	pub address: Address,
	pub coverage: Coverage,
	pub effective_date: NaiveDate,
	pub vehicle: Option<VehicleInfo>,
	pub property: Option<PropertyInfo>,
}

impl QuoteRequest {
	/// Create a request with a fresh id and no optional sections
	pub fn new(product_line: ProductLine, effective_date: NaiveDate) -> Self {
		Self {
			request_id: Uuid::new_v4().to_string(),
			product_line,
			applicant: Applicant::default(),
			address: Address::default(),
			coverage: Coverage::default(),
			effective_date,
			vehicle: None,
			property: None,
		}
	}

	pub fn with_applicant(mut self, applicant: Applicant) -> Self {
		self.applicant = applicant;
		self
	}

	pub fn with_address(mut self, address: Address) -> Self {
		self.address = address;
		self
	}

	pub fn with_coverage(mut self, coverage: Coverage) -> Self {
		self.coverage = coverage;
		self
	}

	pub fn with_vehicle(mut self, vehicle: VehicleInfo) -> Self {
		self.vehicle = Some(vehicle);
		self
	}

	pub fn with_property(mut self, property: PropertyInfo) -> Self {
		self.property = Some(property);
		self
	}

	/// Check the product-line invariants
	///
	/// Auto requests must carry a vehicle, home requests a property.
	pub fn validate(&self) -> QuoteValidationResult<()> {
		match self.product_line {
			ProductLine::Auto if self.vehicle.is_none() => {
				return Err(QuoteValidationError::MissingSection {
					product_line: self.product_line.to_string(),
					section: fields::VEHICLE.to_string(),
				});
			},
			ProductLine::Home if self.property.is_none() => {
				return Err(QuoteValidationError::MissingSection {
					product_line: self.product_line.to_string(),
					section: fields::PROPERTY.to_string(),
				});
			},
			_ => {},
		}

		for (field, amount) in [
			(fields::COVERAGE_LIMIT, self.coverage.limit),
			(fields::DEDUCTIBLE, self.coverage.deductible),
		] {
			if let Some(value) = amount {
				if value.is_sign_negative() {
					return Err(QuoteValidationError::InvalidAmount {
						field: field.to_string(),
						reason: format!("must not be negative, got {}", value),
					});
				}
			}
		}

		Ok(())
	}

	/// Whether the canonical field `name` is populated
	pub fn has_field(&self, name: &str) -> bool {
		match name {
			fields::PRODUCT_LINE | fields::EFFECTIVE_DATE => true,
			fields::FIRST_NAME => self.applicant.first_name.is_some(),
			fields::LAST_NAME => self.applicant.last_name.is_some(),
			fields::EMAIL => self.applicant.email.is_some(),
			fields::AGE => self.applicant.age.is_some(),
			fields::DATE_OF_BIRTH => self.applicant.date_of_birth.is_some(),
			fields::CREDIT_TIER => self.applicant.credit_tier.is_some(),
			fields::STREET => self.address.street.is_some(),
			fields::CITY => self.address.city.is_some(),
			fields::STATE => self.address.state_code().is_some(),
			fields::ZIP_CODE => self.address.zip_code.is_some(),
			fields::VEHICLE => self.vehicle.is_some(),
			fields::PROPERTY => self.property.is_some(),
			fields::COVERAGE_LIMIT => self.coverage.limit.is_some(),
			fields::DEDUCTIBLE => self.coverage.deductible.is_some(),
			_ => false,
		}
	}

	/// Required fields from `required` that this request does not populate
	pub fn missing_fields<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
		required
			.iter()
			.map(String::as_str)
			.filter(|field| !self.has_field(field))
			.collect()
	}
}
