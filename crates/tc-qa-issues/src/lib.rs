//! Issue and Pull Request Digests
//!
//! Turns JSON exports of a hosting API's issue and pull request listings into
//! tracking-sheet rows: per-repository issue lists, a combined list, the weekly
//! new/closed/open buckets, and merged pull requests in a date range.
//!
//! One [`DigestConfig`] covers what used to be several near-identical
//! variants: whether pull requests count, which authors to keep and which to
//! tag.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod digest;
pub mod error;
pub mod models;

pub use digest::{
    DigestConfig, ISSUE_HEADER, IssueRow, MERGED_HEADER, WEEKLY_HEADER, WeeklyBuckets,
    combined_rows, filter, issue_rows, merged_between, merged_row, validate_range, weekly_buckets,
    weekly_row,
};
pub use error::{Error, Result};
pub use models::{Issue, Label, User, load_issues, parse_issues, short_name};
