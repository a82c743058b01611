//! Best-effort structure returned by the conversational intent extractor
//!
//! The extractor is not authoritative. Its output is converted into
//! [`RawApplicantData`] and then goes through the same presence checks as
//! form input; `has_enough_info` is carried for diagnostics only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Address, IntakeSource, ProductLine, RawApplicantData, VehicleInfo};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AiPersonalInfo {
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub email: Option<String>,
	pub age: Option<u32>,
	/// ISO-8601 date as free text; unparseable values are dropped
	pub date_of_birth: Option<String>,
	pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AiVehicleInfo {
	pub year: Option<u16>,
	pub make: Option<String>,
	pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AiExtraction {
	pub insurance_type: Option<String>,
	pub state: Option<String>,
	pub personal_info: Option<AiPersonalInfo>,
	pub vehicle_info: Option<AiVehicleInfo>,
	pub has_enough_info: bool,
	pub confidence: Option<f64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

impl From<AiExtraction> for RawApplicantData {
	fn from(extraction: AiExtraction) -> Self {
		let personal = extraction.personal_info.unwrap_or_default();

		let vehicle = extraction.vehicle_info.and_then(|v| {
			let vehicle = VehicleInfo {
				year: v.year,
				make: non_blank(v.make),
				model: non_blank(v.model),
				annual_mileage: None,
			};
			if vehicle == VehicleInfo::default() {
				None
			} else {
				Some(vehicle)
			}
		});

		RawApplicantData {
			first_name: non_blank(personal.first_name),
			last_name: non_blank(personal.last_name),
			email: non_blank(personal.email),
			date_of_birth: personal
				.date_of_birth
				.as_deref()
				.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
			age: personal.age,
			address: Address {
				state: non_blank(extraction.state),
				zip_code: non_blank(personal.zip_code),
				..Default::default()
			},
			product_line: extraction
				.insurance_type
				.as_deref()
				.and_then(|t| t.parse::<ProductLine>().ok()),
			vehicle,
			source: IntakeSource::AiExtraction,
			..Default::default()
		}
	}
}
