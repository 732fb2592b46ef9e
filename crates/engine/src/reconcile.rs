//! Reconciliation calculator: validate and apply a loss-quantity submission.
//!
//! Pure computation only. Persistence of an accepted reconciliation goes
//! through the backend collaborator; see the service module.

use crate::error::EngineError;
use crate::models::CountLine;

/// Parse a loss quantity from free-text input.
///
/// Takes the leading integer of the trimmed input; anything non-numeric
/// or empty is treated as zero, matching how the count form has always
/// interpreted blank fields. Numeric input beyond the `i64` range
/// saturates instead of collapsing to zero, so the bounds check still
/// rejects it with the range message.
#[must_use]
pub fn parse_loss(raw: &str) -> i64 {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .char_indices()
        .take_while(|&(i, c)| c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    let prefix = trimmed.get(..digits_end).unwrap_or("");
    match prefix.parse::<i64>() {
        Ok(loss) => loss,
        Err(_) if prefix.bytes().any(|b| b.is_ascii_digit()) => {
            if prefix.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }
        Err(_) => 0,
    }
}

/// Validate a proposed loss against the line's base actual stock.
///
/// A loss is acceptable iff `0 <= loss <= base_actual_stock`; in
/// particular a line with zero base stock only accepts a zero loss.
///
/// # Errors
///
/// Returns [`EngineError::OutOfRangeLoss`] with the valid range when the
/// bound is violated.
pub const fn check_loss(base_actual_stock: i64, loss: i64) -> Result<(), EngineError> {
    if loss < 0 || loss > base_actual_stock {
        Err(EngineError::OutOfRangeLoss {
            loss,
            max: base_actual_stock,
        })
    } else {
        Ok(())
    }
}

/// Apply an accepted loss to a line, returning the updated line.
///
/// Sets `current_loss`, derives `resulting_actual_stock`, stores the
/// note, and marks the line checked. Idempotent per line: reapplying
/// overwrites the previous values rather than accumulating.
///
/// # Errors
///
/// Returns [`EngineError::OutOfRangeLoss`] when `loss` falls outside
/// `[0, base_actual_stock]`; the input line is untouched.
pub fn apply(line: &CountLine, loss: i64, note: Option<String>) -> Result<CountLine, EngineError> {
    check_loss(line.base_actual_stock, loss)?;
    let mut updated = line.clone();
    updated.current_loss = loss;
    updated.resulting_actual_stock = line.base_actual_stock - loss;
    updated.note = note;
    updated.checked = true;
    Ok(updated)
}
