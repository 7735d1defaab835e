//! Text published by a grouping run: annotations, descriptions, commit messages

use crate::types::PrRef;
use std::collections::HashSet;
use std::fmt::Write;

/// Annotation linking a forwarding PR to one of its package PRs
///
/// `products/SLFO!4 (pool/curl!12)`
pub fn closes_annotation(forwarding: &PrRef, package: &PrRef) -> String {
    format!(
        "{} ({})",
        forwarding.to_package_ref(),
        package.to_package_ref()
    )
}

/// Description of the staging PR
///
/// Both lists are expected sorted and deduplicated already.
pub fn build_description(packages: &[PrRef], closes: &[String]) -> String {
    let pr_lines: Vec<String> = packages
        .iter()
        .map(|p| format!("PR: {}", p.to_package_ref()))
        .collect();
    let closes_lines: Vec<String> = closes.iter().map(|c| format!("Closes: {c}")).collect();

    format!("{}\n\n{}", pr_lines.join("\n"), closes_lines.join("\n"))
}

/// Bullet list of the annotations belonging to each forwarding PR, in the
/// order the forwarding PRs were given
pub fn commit_body(forwarding: &[PrRef], closes: &[String]) -> String {
    let mut seen = HashSet::new();
    let mut body = String::new();

    for fwd in forwarding.iter().filter(|f| seen.insert(*f)) {
        let prefix = format!("{} (", fwd.to_package_ref());
        for annotation in closes.iter().filter(|c| c.starts_with(&prefix)) {
            let _ = writeln!(body, "- {annotation}");
        }
    }

    body
}

/// Commit message for a newly created staging PR
pub fn created_commit_message(title: &str, body: &str) -> String {
    format!("Created staging PR {title}\n\n{body}")
}

/// Commit message when adding to an existing staging PR
pub fn updated_commit_message(body: &str) -> String {
    format!("Updated staging PR with following PRs\n\n{body}")
}
