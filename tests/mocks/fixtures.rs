//! Intake fixtures

#![allow(dead_code)]

use smartquote::chrono::NaiveDate;
use smartquote::serde_json::{json, Value};
use smartquote::types::{Address, CreditTier, VehicleInfo};
use smartquote::{ProductLine, RawApplicantData};

pub struct Fixtures;

impl Fixtures {
	pub fn effective_date() -> NaiveDate {
		NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
	}

	/// Complete auto intake
	pub fn auto_intake() -> RawApplicantData {
		RawApplicantData {
			first_name: Some("Jordan".to_string()),
			last_name: Some("Reyes".to_string()),
			email: Some("jordan@example.com".to_string()),
			date_of_birth: NaiveDate::from_ymd_opt(1988, 4, 12),
			address: Address {
				street: Some("12 Elm St".to_string()),
				city: Some("Austin".to_string()),
				state: Some("TX".to_string()),
				zip_code: Some("78701".to_string()),
			},
			product_line: Some(ProductLine::Auto),
			credit_tier: Some(CreditTier::Good),
			prior_claims: Some(1),
			vehicle: Some(VehicleInfo {
				year: Some(2019),
				make: Some("Subaru".to_string()),
				model: Some("Outback".to_string()),
				annual_mileage: Some(11_000),
			}),
			effective_date: Some(Self::effective_date()),
			..Default::default()
		}
	}

	/// Auto intake with no state
	pub fn auto_intake_without_state() -> RawApplicantData {
		let mut intake = Self::auto_intake();
		intake.address.state = None;
		intake
	}

	pub fn auto_intake_json() -> Value {
		json!({
			"firstName": "Jordan",
			"dateOfBirth": "1988-04-12",
			"address": { "state": "tx", "zipCode": "78701" },
			"productLine": "auto",
			"creditTier": "good",
			"priorClaims": 0,
			"vehicle": { "year": 2019, "make": "Subaru", "model": "Outback" },
			"effectiveDate": "2025-06-01"
		})
	}

	pub fn ai_extraction_json() -> Value {
		json!({
			"insuranceType": "car",
			"state": "CA",
			"personalInfo": { "firstName": "Sam", "age": 31, "zipCode": "94110" },
			"vehicleInfo": { "year": 2021, "make": "Tesla", "model": "Model 3" },
			"hasEnoughInfo": true,
			"confidence": 0.72
		})
	}
}
