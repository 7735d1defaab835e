//! CLI progress callback with styled output

use crate::cli::style::{arrow, check, cross, hyperlink_url, Stream, Stylize};
use anstream::{eprintln, println};
use async_trait::async_trait;
use git_staging::group::{Phase, ProgressCallback};
use git_staging::types::{PrRef, PullRequest};

/// CLI progress callback that prints to stdout with styled output
///
/// Missing pull requests are reported on stderr as they are found.
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        if phase != Phase::Complete {
            println!("{}...", phase.to_string().emphasis());
        }
    }

    async fn on_forwarded(&self, pr: &PullRequest, packages: &[PrRef]) {
        println!(
            "  {} {} {}",
            check(),
            pr.reference().accent(),
            pr.title.muted()
        );
        for package in packages {
            println!("    {} {}", arrow(), package.to_package_ref());
        }
    }

    async fn on_package(&self, reference: &PrRef) {
        println!("  Processing package PR {}", reference.accent());
    }

    async fn on_not_found(&self, reference: &PrRef) {
        eprintln!(
            "  {} {} {}",
            cross(),
            reference.accent().for_stderr(),
            "not found".warn()
        );
    }

    async fn on_pr_created(&self, pr: &PullRequest) {
        println!(
            "  {} Created PR {}",
            check(),
            format!("#{}", pr.number).accent()
        );
        println!("    {}", hyperlink_url(Stream::Stdout, &pr.html_url));
    }

    async fn on_pr_updated(&self, pr: &PullRequest) {
        println!(
            "  {} Updated description of PR {}",
            check(),
            format!("#{}", pr.number).accent()
        );
    }

    async fn on_pr_closed(&self, reference: &PrRef) {
        println!("  {} Closed {}", check(), reference.accent());
    }

    async fn on_message(&self, message: &str) {
        println!("  {}", message.muted());
    }
}
