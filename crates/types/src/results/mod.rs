//! Aggregation, scoring and recommendation results

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::carriers::{CarrierFailure, CarrierQuote};
use crate::risk::RiskProfile;

/// Gateway output: two disjoint sequences, one entry per requested carrier
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResult {
	pub quotes: Vec<CarrierQuote>,
	pub failures: Vec<CarrierFailure>,
}

impl GatewayResult {
	pub fn carrier_count(&self) -> usize {
		self.quotes.len() + self.failures.len()
	}
}

/// A carrier quote with the scores derived for one request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredQuote {
	pub quote: CarrierQuote,
	/// Margin value relative to the other quotes of the same request, 0..=100
	pub profitability_score: f64,
	/// Estimated probability the applicant accepts, 0..=1
	pub conversion_probability: f64,
	/// Combined carrier-reported and configured reliability, 0..=1
	pub reliability: f64,
	pub composite_score: f64,
	/// 1-based position after ranking
	pub rank: usize,
}

impl ScoredQuote {
	pub fn carrier_id(&self) -> &str {
		&self.quote.carrier_id
	}
}

/// Business constraints applied when composing the recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusinessPolicy {
	/// Profitability floor for an unflagged recommendation
	pub min_margin_score: f64,
	pub max_alternatives: usize,
	/// Keep at most one alternative per carrier
	pub carrier_diversity: bool,
}

impl Default for BusinessPolicy {
	fn default() -> Self {
		Self {
			min_margin_score: 40.0,
			max_alternatives: 4,
			carrier_diversity: true,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
	/// Highest minus lowest annual premium among successful quotes
	pub estimated_savings: Decimal,
	pub lowest_annual_premium: Option<Decimal>,
	pub highest_annual_premium: Option<Decimal>,
	pub carriers_queried: usize,
	pub carriers_quoted: usize,
	pub carriers_failed: usize,
}

/// The engine's sole return contract
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmartQuoteResult {
	pub request_id: String,
	pub success: bool,
	pub recommended_carrier: Option<String>,
	pub recommendation: Option<ScoredQuote>,
	/// Curated view: diverse by carrier and capped by the policy
	pub alternatives: Vec<ScoredQuote>,
	/// Every scored quote in rank order, recommendation included
	pub ranked_quotes: Vec<ScoredQuote>,
	pub metrics: AggregateMetrics,
	pub failures: Vec<CarrierFailure>,
	/// Set when the recommendation is below the margin floor
	pub margin_warning: bool,
	pub error: Option<String>,
	pub risk_profile: Option<RiskProfile>,
	pub generated_at: DateTime<Utc>,
}

impl SmartQuoteResult {
	/// A result with no recommendation and a caller-facing reason
	pub fn failed(
		request_id: impl Into<String>,
		error: impl Into<String>,
		failures: Vec<CarrierFailure>,
	) -> Self {
		let carriers_failed = failures.len();
		Self {
			request_id: request_id.into(),
			success: false,
			recommended_carrier: None,
			recommendation: None,
			alternatives: Vec::new(),
			ranked_quotes: Vec::new(),
			metrics: AggregateMetrics {
				carriers_queried: carriers_failed,
				carriers_failed,
				..Default::default()
			},
			failures,
			margin_warning: false,
			error: Some(error.into()),
			risk_profile: None,
			generated_at: Utc::now(),
		}
	}

	pub fn with_risk_profile(mut self, profile: RiskProfile) -> Self {
		self.risk_profile = Some(profile);
		self
	}

	/// Every quote surfaced to the caller, recommendation first
	pub fn presented_quotes(&self) -> impl Iterator<Item = &ScoredQuote> {
		self.recommendation.iter().chain(self.alternatives.iter())
	}
}
