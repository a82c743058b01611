//! Error types for canonical quote requests

use thiserror::Error;

/// Validation errors raised while building or checking a [`super::QuoteRequest`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteValidationError {
	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },

	#[error("Product line {product_line} requires {section} details")]
	MissingSection {
		product_line: String,
		section: String,
	},

	#[error("Invalid amount: {field} - {reason}")]
	InvalidAmount { field: String, reason: String },

	#[error("Invalid date: {field} - {reason}")]
	InvalidDate { field: String, reason: String },
}
