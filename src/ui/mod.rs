//! Terminal presentation
//!
//! Rendering of references, flakes and dependency trees for the commands.
//! Fetch progress is shown separately by [`crate::fetch::ProgressFetcher`].

pub mod display;
