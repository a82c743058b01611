//! Recommendation composition
//!
//! Turns a ranked batch plus the gateway failures into the final result,
//! applying the business policy (margin floor, alternative count, carrier
//! diversity).

use rust_decimal::Decimal;
use smartquote_types::{
	AggregateMetrics, BusinessPolicy, CarrierFailure, FailureKind, ScoredQuote, SmartQuoteResult,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Error text when no carrier was eligible to be asked at all
pub const NO_ELIGIBLE_CARRIERS: &str = "No eligible carriers for this request";

/// Stateless composer; the policy is supplied per call
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationComposer;

impl RecommendationComposer {
	pub fn new() -> Self {
		Self
	}

	/// Build the result for one request
	///
	/// `scored` must already be in rank order. Every input quote is kept in
	/// `ranked_quotes`; the policy only shapes the recommendation and the
	/// alternatives view. Failures are carried through unchanged.
	pub fn compose(
		&self,
		request_id: &str,
		scored: Vec<ScoredQuote>,
		failures: Vec<CarrierFailure>,
		policy: &BusinessPolicy,
	) -> SmartQuoteResult {
		if scored.is_empty() {
			let error = failure_summary(&failures);
			warn!("Request {} produced no usable quotes: {}", request_id, error);
			return SmartQuoteResult::failed(request_id, error, failures);
		}

		let metrics = aggregate_metrics(&scored, &failures);
		let ranked_quotes = scored.clone();

		let (recommended_index, margin_warning) = match scored
			.iter()
			.position(|q| q.profitability_score >= policy.min_margin_score)
		{
			Some(index) => (index, false),
			None => (0, true),
		};

		let mut remaining = scored;
		let recommendation = remaining.remove(recommended_index);
		let alternatives = select_alternatives(&recommendation, remaining, policy);

		if margin_warning {
			warn!(
				"Request {}: no quote meets the margin floor {}; recommending {} with a warning",
				request_id,
				policy.min_margin_score,
				recommendation.carrier_id()
			);
		}
		debug!(
			"Request {}: recommended {} with {} alternatives",
			request_id,
			recommendation.carrier_id(),
			alternatives.len()
		);

		SmartQuoteResult {
			request_id: request_id.to_string(),
			success: true,
			recommended_carrier: Some(recommendation.carrier_id().to_string()),
			recommendation: Some(recommendation),
			alternatives,
			ranked_quotes,
			metrics,
			failures,
			margin_warning,
			error: None,
			risk_profile: None,
			generated_at: chrono::Utc::now(),
		}
	}
}

fn select_alternatives(
	recommendation: &ScoredQuote,
	remaining: Vec<ScoredQuote>,
	policy: &BusinessPolicy,
) -> Vec<ScoredQuote> {
	if !policy.carrier_diversity {
		return remaining.into_iter().take(policy.max_alternatives).collect();
	}

	let mut seen: HashSet<String> = HashSet::new();
	seen.insert(recommendation.carrier_id().to_string());

	remaining
		.into_iter()
		.filter(|q| seen.insert(q.carrier_id().to_string()))
		.take(policy.max_alternatives)
		.collect()
}

fn aggregate_metrics(scored: &[ScoredQuote], failures: &[CarrierFailure]) -> AggregateMetrics {
	let annuals = scored.iter().map(|q| q.quote.premium.annual());
	let lowest = annuals.clone().min();
	let highest = annuals.max();

	let estimated_savings = match (lowest, highest) {
		(Some(low), Some(high)) => high - low,
		_ => Decimal::ZERO,
	};

	AggregateMetrics {
		estimated_savings,
		lowest_annual_premium: lowest,
		highest_annual_premium: highest,
		carriers_queried: scored.len() + failures.len(),
		carriers_quoted: scored.len(),
		carriers_failed: failures.len(),
	}
}

/// Caller-facing reason when nothing could be quoted, e.g.
/// "No carrier returned a usable quote (2 timeout, 1 auth)"
pub fn failure_summary(failures: &[CarrierFailure]) -> String {
	if failures.is_empty() {
		return NO_ELIGIBLE_CARRIERS.to_string();
	}

	let mut counts: BTreeMap<FailureKind, usize> = BTreeMap::new();
	for failure in failures {
		*counts.entry(failure.kind).or_default() += 1;
	}

	let breakdown = counts
		.iter()
		.map(|(kind, count)| format!("{} {}", count, kind))
		.collect::<Vec<_>>()
		.join(", ");

	format!("No carrier returned a usable quote ({})", breakdown)
}
