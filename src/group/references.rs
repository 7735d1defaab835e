//! Reference lines embedded in pull request descriptions
//!
//! Descriptions are scanned line by line. A line must start at column 0:
//!
//! ```text
//! PR: pool/curl!12
//! Closes: products/SLFO!4 (pool/curl!12)
//! ```

use crate::types::PrRef;

const PR_PREFIX: &str = "PR:";
const CLOSES_PREFIX: &str = "Closes:";

/// Package pull requests declared by `PR:` lines
///
/// Malformed lines are skipped. Order follows the description.
pub fn parse_pr_references(body: &str) -> Vec<PrRef> {
    body.lines()
        .filter_map(|line| line.trim_end().strip_prefix(PR_PREFIX))
        .filter_map(|value| parse_package_ref(value.trim_start()))
        .collect()
}

/// Annotations carried by `Closes:` lines
pub fn parse_closes(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.trim_end().strip_prefix(CLOSES_PREFIX))
        .map(str::trim_start)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// `owner/repo!number`, exactly two path segments
fn parse_package_ref(value: &str) -> Option<PrRef> {
    if value.contains(char::is_whitespace) {
        return None;
    }
    let reference: PrRef = value.parse().ok()?;
    (!reference.owner.contains('/')).then_some(reference)
}
