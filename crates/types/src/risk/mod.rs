//! Applicant risk profile

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse risk band; ordering goes from least to most conservative
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
	Low,
	Medium,
	High,
}

impl fmt::Display for RiskTier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
		};
		f.write_str(label)
	}
}

/// One named signal that contributed to the risk score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
	pub name: String,
	/// Configured weight of this factor
	pub weight: f64,
	/// Normalized signal in 0.0..=1.0 (1.0 is riskiest)
	pub signal: f64,
	/// `weight * signal`
	pub contribution: f64,
}

impl RiskFactor {
	pub fn new(name: impl Into<String>, weight: f64, signal: f64) -> Self {
		let signal = signal.clamp(0.0, 1.0);
		Self {
			name: name.into(),
			weight,
			signal,
			contribution: weight * signal,
		}
	}
}

/// Derived risk profile, computed once per intake and never mutated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
	tier: RiskTier,
	score: f64,
	factors: Vec<RiskFactor>,
	missing_fields: Vec<String>,
}

impl RiskProfile {
	pub fn new(
		tier: RiskTier,
		score: f64,
		factors: Vec<RiskFactor>,
		missing_fields: Vec<String>,
	) -> Self {
		Self {
			tier,
			score: score.clamp(0.0, 100.0),
			factors,
			missing_fields,
		}
	}

	pub fn tier(&self) -> RiskTier {
		self.tier
	}

	/// Risk score in 0.0..=100.0
	pub fn score(&self) -> f64 {
		self.score
	}

	pub fn factors(&self) -> &[RiskFactor] {
		&self.factors
	}

	pub fn missing_fields(&self) -> &[String] {
		&self.missing_fields
	}

	pub fn is_complete(&self) -> bool {
		self.missing_fields.is_empty()
	}

	pub fn factor(&self, name: &str) -> Option<&RiskFactor> {
		self.factors.iter().find(|f| f.name == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tier_ordering_is_conservative_last() {
		assert!(RiskTier::Low < RiskTier::Medium);
		assert!(RiskTier::Medium < RiskTier::High);
		assert_eq!(RiskTier::Low.max(RiskTier::High), RiskTier::High);
	}

	#[test]
	fn test_factor_signal_clamped() {
		let factor = RiskFactor::new("claims_history", 30.0, 1.7);
		assert_eq!(factor.signal, 1.0);
		assert_eq!(factor.contribution, 30.0);
	}

	#[test]
	fn test_profile_score_clamped() {
		let profile = RiskProfile::new(RiskTier::High, 140.0, vec![], vec!["state".to_string()]);
		assert_eq!(profile.score(), 100.0);
		assert!(!profile.is_complete());
	}
}
