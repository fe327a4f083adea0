//! Terminal output utilities.

use crate::engine::Classification;
use crate::policy::Outcome;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// Print a per-run summary of a classification to stdout.
pub fn print_summary(classification: &Classification) {
    let flagged = classification.flagged_count();
    let not_flagged = classification
        .verdicts
        .iter()
        .filter(|v| v.outcome == Outcome::NotFlagged)
        .count();

    println!(
        "#{policy}# {total} subnets evaluated: {flagged} {flagged_word}, {not_flagged} not flagged, {errors} errors",
        policy = classification.policy,
        total = classification.verdicts.len(),
        flagged_word = if flagged > 0 {
            "FLAGGED".on_red().to_string()
        } else {
            "flagged".to_string()
        },
        errors = classification.errors.len(),
    );

    for error in &classification.errors {
        let subnet = error.subnet_name.as_deref().unwrap_or("<no subnet>");
        println!(
            "#{err}# subnet {subnet}: {detail}",
            err = "ERROR".on_red(),
            detail = error.error
        );
    }
}
