//! Shared test utilities

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod mock_git;
pub mod mock_platform;

pub use fixtures::*;
pub use mock_git::MockGit;
pub use mock_platform::MockPlatformService;
