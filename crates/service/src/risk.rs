//! Risk & eligibility extraction
//!
//! Derives a [`RiskProfile`] from raw intake and maps intake into the
//! canonical [`QuoteRequest`]. Both are pure functions of their input: no I/O,
//! no clock reads once the effective date is known.

use chrono::{Datelike, NaiveDate, Utc};
use smartquote_config::RiskSettings;
use smartquote_types::quotes::fields;
use smartquote_types::{
	Applicant, Coverage, CreditTier, ProductLine, QuoteRequest, QuoteValidationError,
	RawApplicantData, RiskFactor, RiskProfile, RiskTier,
};
use tracing::debug;

/// Factor names as they appear on [`RiskProfile::factors`]
pub mod factor_names {
	pub const AGE: &str = "age_band";
	pub const CREDIT: &str = "credit_tier";
	pub const CLAIMS: &str = "claims_history";
	pub const GEOGRAPHY: &str = "geographic_index";
	pub const VEHICLE: &str = "vehicle";
	pub const PROPERTY: &str = "property";
}

/// Signal used when the input for a factor is unknown
const NEUTRAL_SIGNAL: f64 = 0.5;

/// Claims at which the claims signal saturates
const CLAIMS_SATURATION: u32 = 4;

/// Trait for deriving risk profiles and canonical requests from intake
#[cfg_attr(test, mockall::automock)]
pub trait RiskExtractorTrait: Send + Sync {
	fn extract(&self, intake: &RawApplicantData) -> RiskProfile;

	fn build_request(&self, intake: &RawApplicantData) -> Result<QuoteRequest, QuoteValidationError>;
}

/// Rule-based risk extractor
#[derive(Debug, Clone)]
pub struct RiskExtractor {
	settings: RiskSettings,
}

impl Default for RiskExtractor {
	fn default() -> Self {
		Self::new(RiskSettings::default())
	}
}

impl RiskExtractor {
	pub fn new(settings: RiskSettings) -> Self {
		Self { settings }
	}

	pub fn settings(&self) -> &RiskSettings {
		&self.settings
	}

	/// Date the applicant's age and asset ages are measured against
	fn reference_date(intake: &RawApplicantData) -> NaiveDate {
		intake
			.effective_date
			.unwrap_or_else(|| Utc::now().date_naive())
	}

	/// Required fields absent from the intake, in a fixed order
	pub fn missing_fields(intake: &RawApplicantData) -> Vec<String> {
		let as_of = Self::reference_date(intake);
		let mut missing = Vec::new();

		if intake.product_line.is_none() {
			missing.push(fields::PRODUCT_LINE.to_string());
		}
		if intake.address.state_code().is_none() {
			missing.push(fields::STATE.to_string());
		}
		if intake.age_on(as_of).is_none() {
			missing.push(fields::AGE.to_string());
		}
		match intake.product_line {
			Some(ProductLine::Auto) if intake.vehicle.is_none() => {
				missing.push(fields::VEHICLE.to_string());
			},
			Some(ProductLine::Home) if intake.property.is_none() => {
				missing.push(fields::PROPERTY.to_string());
			},
			_ => {},
		}

		missing
	}

	fn age_signal(age: Option<u32>) -> f64 {
		match age {
			None => NEUTRAL_SIGNAL,
			Some(age) if age < 25 => 0.9,
			Some(age) if age < 30 => 0.6,
			Some(age) if age < 65 => 0.3,
			Some(age) if age < 75 => 0.5,
			Some(_) => 0.8,
		}
	}

	fn credit_signal(tier: Option<CreditTier>) -> f64 {
		match tier {
			None => NEUTRAL_SIGNAL,
			Some(CreditTier::Excellent) => 0.1,
			Some(CreditTier::Good) => 0.3,
			Some(CreditTier::Fair) => 0.6,
			Some(CreditTier::Poor) => 0.9,
		}
	}

	fn claims_signal(prior_claims: Option<u32>) -> f64 {
		let claims = prior_claims.unwrap_or(0).min(CLAIMS_SATURATION);
		f64::from(claims) / f64::from(CLAIMS_SATURATION)
	}

	fn geographic_signal(&self, state: Option<&str>) -> f64 {
		state
			.and_then(|code| self.settings.state_index.get(code))
			.copied()
			.unwrap_or(self.settings.default_state_index)
			.clamp(0.0, 1.0)
	}

	/// Mean of the known signals, neutral when none are known
	fn mean_signal(signals: &[Option<f64>]) -> f64 {
		let known: Vec<f64> = signals.iter().flatten().copied().collect();
		if known.is_empty() {
			NEUTRAL_SIGNAL
		} else {
			known.iter().sum::<f64>() / known.len() as f64
		}
	}

	/// Product-specific factor; life and commercial carry none
	fn product_factor(&self, intake: &RawApplicantData, as_of: NaiveDate) -> Option<RiskFactor> {
		let weight = self.settings.weights.product;
		let current_year = as_of.year();

		match intake.product_line? {
			ProductLine::Auto => {
				let signal = intake.vehicle.as_ref().map_or(NEUTRAL_SIGNAL, |vehicle| {
					let age = vehicle
						.year
						.map(|year| (f64::from(current_year - i32::from(year))).clamp(0.0, 20.0) / 20.0);
					let mileage = vehicle
						.annual_mileage
						.map(|miles| f64::from(miles.min(30_000)) / 30_000.0);
					Self::mean_signal(&[age, mileage])
				});
				Some(RiskFactor::new(factor_names::VEHICLE, weight, signal))
			},
			ProductLine::Home => {
				let signal = intake.property.as_ref().map_or(NEUTRAL_SIGNAL, |property| {
					let age = property.year_built.map(|year| {
						(f64::from(current_year - i32::from(year))).clamp(0.0, 100.0) / 100.0
					});
					Self::mean_signal(&[age])
				});
				Some(RiskFactor::new(factor_names::PROPERTY, weight, signal))
			},
			ProductLine::Life | ProductLine::Commercial => None,
		}
	}

	/// Map a score onto a tier; a score on a threshold takes the higher tier
	pub fn tier_for(&self, score: f64) -> RiskTier {
		let bands = &self.settings.bands;
		if score < bands.low_max {
			RiskTier::Low
		} else if score < bands.medium_max {
			RiskTier::Medium
		} else {
			RiskTier::High
		}
	}
}

impl RiskExtractorTrait for RiskExtractor {
	fn extract(&self, intake: &RawApplicantData) -> RiskProfile {
		let as_of = Self::reference_date(intake);
		let weights = &self.settings.weights;
		let state = intake.address.state_code();

		let mut factors = vec![
			RiskFactor::new(
				factor_names::AGE,
				weights.age,
				Self::age_signal(intake.age_on(as_of)),
			),
			RiskFactor::new(
				factor_names::CREDIT,
				weights.credit,
				Self::credit_signal(intake.credit_tier),
			),
			RiskFactor::new(
				factor_names::CLAIMS,
				weights.claims,
				Self::claims_signal(intake.prior_claims),
			),
			RiskFactor::new(
				factor_names::GEOGRAPHY,
				weights.geography,
				self.geographic_signal(state.as_deref()),
			),
		];
		if let Some(product) = self.product_factor(intake, as_of) {
			factors.push(product);
		}

		let total_weight: f64 = factors.iter().map(|f| f.weight).sum();
		let score = if total_weight > 0.0 {
			100.0 * factors.iter().map(|f| f.contribution).sum::<f64>() / total_weight
		} else {
			0.0
		}
		.clamp(0.0, 100.0);

		let missing = Self::missing_fields(intake);
		let tier = self.tier_for(score);

		debug!(
			"Extracted risk profile: score {:.1}, tier {}, {} missing field(s)",
			score,
			tier,
			missing.len()
		);

		RiskProfile::new(tier, score, factors, missing)
	}

	fn build_request(&self, intake: &RawApplicantData) -> Result<QuoteRequest, QuoteValidationError> {
		let product_line =
			intake
				.product_line
				.ok_or_else(|| QuoteValidationError::MissingRequiredField {
					field: fields::PRODUCT_LINE.to_string(),
				})?;

		let effective_date = Self::reference_date(intake);

		if let Some(dob) = intake.date_of_birth {
			if dob > effective_date {
				return Err(QuoteValidationError::InvalidDate {
					field: fields::DATE_OF_BIRTH.to_string(),
					reason: format!("{} is after the effective date {}", dob, effective_date),
				});
			}
		}

		let mut address = intake.address.clone();
		address.state = address.state_code();

		let mut request = QuoteRequest::new(product_line, effective_date)
			.with_applicant(Applicant {
				first_name: intake.first_name.clone(),
				last_name: intake.last_name.clone(),
				email: intake.email.clone(),
				age: intake.age_on(effective_date),
				date_of_birth: intake.date_of_birth,
				credit_tier: intake.credit_tier,
				prior_claims: intake.prior_claims.unwrap_or(0),
			})
			.with_address(address)
			.with_coverage(Coverage {
				limit: intake.coverage.liability_limit,
				deductible: intake.coverage.deductible,
			});

		if let Some(vehicle) = &intake.vehicle {
			request = request.with_vehicle(vehicle.clone());
		}
		if let Some(property) = &intake.property {
			request = request.with_property(property.clone());
		}

		request.validate()?;
		Ok(request)
	}
}
