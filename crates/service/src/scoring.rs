//! Quote scoring and ranking
//!
//! Scores are relative to the batch: profitability is min-max normalized and
//! conversion is measured against the batch median premium, so a score only
//! means something next to the other quotes of the same request.

use smartquote_config::ScoringSettings;
use smartquote_types::{CarrierDescriptor, CarrierQuote, RiskProfile, ScoredQuote};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Margins closer than this are treated as equal
const MARGIN_EPSILON: f64 = 1e-9;

/// Trait for ranking a batch of carrier quotes
#[cfg_attr(test, mockall::automock)]
pub trait QuoteScorerTrait: Send + Sync {
	/// Score and order `quotes`, best first
	///
	/// Total: the output has exactly one entry per input quote.
	fn rank(&self, quotes: &[CarrierQuote], profile: &RiskProfile) -> Vec<ScoredQuote>;
}

/// Static per-carrier scoring inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierScoringProfile {
	/// Historical close-rate uplift, looked up rather than learned
	pub close_rate_boost: f64,
	/// Configured reliability, 0..=1
	pub reliability: f64,
}

impl Default for CarrierScoringProfile {
	fn default() -> Self {
		Self {
			close_rate_boost: 0.0,
			reliability: 1.0,
		}
	}
}

impl From<&CarrierDescriptor> for CarrierScoringProfile {
	fn from(descriptor: &CarrierDescriptor) -> Self {
		Self {
			close_rate_boost: descriptor.close_rate_boost,
			reliability: descriptor.reliability,
		}
	}
}

/// Weighted profitability / conversion / reliability scorer
#[derive(Debug, Clone, Default)]
pub struct QuoteScorer {
	settings: ScoringSettings,
	carriers: HashMap<String, CarrierScoringProfile>,
}

impl QuoteScorer {
	pub fn new(settings: ScoringSettings) -> Self {
		Self {
			settings,
			carriers: HashMap::new(),
		}
	}

	/// Attach the close-rate and reliability table from carrier descriptors
	pub fn with_carriers(mut self, descriptors: &[CarrierDescriptor]) -> Self {
		self.carriers = descriptors
			.iter()
			.map(|d| (d.carrier_id.clone(), CarrierScoringProfile::from(d)))
			.collect();
		self
	}

	pub fn with_carrier_profile(
		mut self,
		carrier_id: impl Into<String>,
		profile: CarrierScoringProfile,
	) -> Self {
		self.carriers.insert(carrier_id.into(), profile);
		self
	}

	fn carrier_profile(&self, carrier_id: &str) -> CarrierScoringProfile {
		self.carriers.get(carrier_id).copied().unwrap_or_default()
	}

	/// Commission revenue minus the risk-scaled claims-cost proxy
	fn raw_margin(&self, quote: &CarrierQuote, risk_score: f64) -> f64 {
		let annual = quote.premium.annual_f64();
		let claims_cost = self.settings.claims_cost_ratio * (risk_score / 100.0) * annual;
		quote.commission_rate * annual - claims_cost
	}

	/// Conversion estimate; strictly decreasing in premium relative to the median
	fn conversion(&self, annual: f64, median: f64, close_rate_boost: f64) -> f64 {
		let relative = if median > 0.0 { annual / median - 1.0 } else { 0.0 };
		let base = self.settings.base_conversion * (-self.settings.price_elasticity * relative).exp();
		let uplift = 1.0 + self.settings.close_rate_weight * close_rate_boost.max(0.0);
		(base * uplift).clamp(0.0, 1.0)
	}

	fn composite(&self, profitability: f64, conversion: f64, reliability: f64) -> f64 {
		let s = &self.settings;
		let total = s.profitability_weight + s.conversion_weight + s.reliability_weight;
		let weighted = s.profitability_weight * profitability / 100.0
			+ s.conversion_weight * conversion
			+ s.reliability_weight * reliability;
		if total > 0.0 {
			weighted / total
		} else {
			weighted
		}
	}
}

/// Median of a non-empty slice
fn median(values: &[f64]) -> f64 {
	let mut sorted = values.to_vec();
	sorted.sort_by(f64::total_cmp);
	let mid = sorted.len() / 2;
	if sorted.len() % 2 == 0 {
		(sorted[mid - 1] + sorted[mid]) / 2.0
	} else {
		sorted[mid]
	}
}

/// Best first: composite desc, then cheaper annual premium, then carrier id
fn ranking_order(a: &ScoredQuote, b: &ScoredQuote) -> Ordering {
	b.composite_score
		.total_cmp(&a.composite_score)
		.then_with(|| a.quote.premium.annual().cmp(&b.quote.premium.annual()))
		.then_with(|| a.quote.carrier_id.cmp(&b.quote.carrier_id))
		.then_with(|| a.quote.quote_id.cmp(&b.quote.quote_id))
}

impl QuoteScorerTrait for QuoteScorer {
	fn rank(&self, quotes: &[CarrierQuote], profile: &RiskProfile) -> Vec<ScoredQuote> {
		if quotes.is_empty() {
			return Vec::new();
		}

		let margins: Vec<f64> = quotes
			.iter()
			.map(|q| self.raw_margin(q, profile.score()))
			.collect();
		let min_margin = margins.iter().copied().fold(f64::INFINITY, f64::min);
		let max_margin = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
		let spread = max_margin - min_margin;

		let annuals: Vec<f64> = quotes.iter().map(|q| q.premium.annual_f64()).collect();
		let median_annual = median(&annuals);

		let mut scored: Vec<ScoredQuote> = quotes
			.iter()
			.zip(margins)
			.zip(annuals)
			.map(|((quote, margin), annual)| {
				let carrier = self.carrier_profile(&quote.carrier_id);

				// A degenerate batch has no spread to normalize; score it on the sign of the margin
				let profitability = if spread.abs() < MARGIN_EPSILON {
					if margin > 0.0 {
						100.0
					} else {
						0.0
					}
				} else {
					100.0 * (margin - min_margin) / spread
				};
				let conversion = self.conversion(annual, median_annual, carrier.close_rate_boost);
				let reliability = (quote.confidence * carrier.reliability).clamp(0.0, 1.0);

				ScoredQuote {
					quote: quote.clone(),
					profitability_score: profitability.clamp(0.0, 100.0),
					conversion_probability: conversion,
					reliability,
					composite_score: self.composite(profitability, conversion, reliability),
					rank: 0,
				}
			})
			.collect();

		scored.sort_by(ranking_order);
		for (position, quote) in scored.iter_mut().enumerate() {
			quote.rank = position + 1;
		}

		debug!(
			"Ranked {} quotes (median annual {:.2}, margin spread {:.2})",
			scored.len(),
			median_annual,
			spread
		);

		scored
	}
}
