//! git-staging - group package pull requests into staging pull requests
//!
//! Forwarded package PRs labeled for staging are collected into one staging
//! PR against a project repository that tracks packages as git submodules.
//! Works with Gitea, GitHub and GitLab.

pub mod auth;
pub mod config;
pub mod error;
pub mod git;
pub mod group;
pub mod platform;
pub mod types;

pub use error::{Error, Result};
