//! # Selection Number Space
//!
//! Raffles using the `selection_number` method let each entrant claim a
//! number from `1..=number_quantity`, displayed with `number_digits`
//! zero-padded digits. [`NumberSpace`] is the single owner of that format:
//! admission normalizes entrant input through it, and winner selection
//! normalizes the drawn number the same way before matching.
//!
//! ## Canonical Form
//!
//! ```text
//! quantity = 500, digits = 3
//!   "7"    -> "007"
//!   "007"  -> "007"
//!   " 42 " -> "042"
//!   "0"    -> rejected (below 1)
//!   "501"  -> rejected (above quantity)
//!   "0042" -> rejected (wider than 3 digits)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest permitted display width for selection numbers.
pub const MAX_NUMBER_DIGITS: u8 = 10;

/// The number space of a `selection_number` raffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberSpace {
    quantity: u64,
    width: u8,
}

impl NumberSpace {
    /// Build a number space from the raffle's configured quantity and
    /// optional display width.
    ///
    /// When `digits` is absent the width is the decimal width of
    /// `quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NumberSpace`] if `quantity` is zero,
    /// `digits` is outside `1..=10`, or `quantity` does not fit in the width.
    pub fn new(quantity: u64, digits: Option<u8>) -> Result<Self, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::NumberSpace(
                "number_quantity must be a positive integer".to_string(),
            ));
        }
        let width = match digits {
            Some(d) if d == 0 || d > MAX_NUMBER_DIGITS => {
                return Err(ValidationError::NumberSpace(format!(
                    "number_digits must be between 1 and {MAX_NUMBER_DIGITS}, got {d}"
                )));
            }
            Some(d) => d,
            None => decimal_width(quantity),
        };
        if width > MAX_NUMBER_DIGITS {
            return Err(ValidationError::NumberSpace(format!(
                "number_quantity {quantity} needs more than {MAX_NUMBER_DIGITS} digits"
            )));
        }
        if decimal_width(quantity) > width {
            return Err(ValidationError::NumberSpace(format!(
                "number_quantity {quantity} does not fit in {width} digits"
            )));
        }
        Ok(Self { quantity, width })
    }

    /// Total count of selectable numbers.
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Display width in digits.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Render a value in canonical zero-padded form.
    pub fn format(&self, value: u64) -> String {
        format!("{:0width$}", value, width = usize::from(self.width))
    }

    /// Parse entrant or drawn input into canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SelectionNumber`] if the input is empty,
    /// non-numeric, wider than the display width, or out of range.
    pub fn normalize(&self, input: &str) -> Result<String, ValidationError> {
        let reject = |reason: String| ValidationError::SelectionNumber {
            value: input.to_string(),
            reason,
        };

        let digits = input.trim();
        if digits.is_empty() {
            return Err(reject("selection number is empty".to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(reject("selection number must contain only digits".to_string()));
        }
        if digits.len() > usize::from(self.width) {
            return Err(reject(format!(
                "selection number is wider than {} digits",
                self.width
            )));
        }
        // At most 10 ASCII digits, always fits in u64.
        let value: u64 = digits
            .parse()
            .map_err(|e: std::num::ParseIntError| reject(e.to_string()))?;
        if value == 0 || value > self.quantity {
            return Err(reject(format!(
                "selection number must be between 1 and {}",
                self.quantity
            )));
        }
        Ok(self.format(value))
    }
}

fn decimal_width(mut value: u64) -> u8 {
    let mut width = 1;
    while value >= 10 {
        value /= 10;
        width += 1;
    }
    width
}
