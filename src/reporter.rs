use crate::diagnostics::Diagnostic;
use crate::errors::{Result, ValidatorError};

/// Turn accumulated discrepancies into the final verdict.
///
/// Succeeds silently when there are no errors; otherwise fails with a
/// [`ValidatorError::Validation`] carrying every error message, so the
/// submitter sees all problems at once. Warnings never fail the run.
pub fn report(discrepancies: &[Diagnostic]) -> Result<()> {
    let errors: Vec<String> = discrepancies
        .iter()
        .filter(|d| d.is_error())
        .map(ToString::to_string)
        .collect();
    if errors.is_empty() {
        return Ok(());
    }
    Err(ValidatorError::Validation { errors })
}
