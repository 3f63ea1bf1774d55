//! Spinner display for fetches

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::flakeref::FlakeRef;

use super::{FetchedSource, Fetcher};

/// Shows a spinner on stderr while the wrapped fetcher works
pub struct ProgressFetcher<F> {
    inner: F,
    style: ProgressStyle,
}

impl<F: Fetcher> ProgressFetcher<F> {
    pub fn new(inner: F) -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        Self { inner, style }
    }
}

impl<F: Fetcher> Fetcher for ProgressFetcher<F> {
    fn fetch(&self, flake_ref: &FlakeRef) -> Result<FetchedSource> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(self.style.clone());
        spinner.set_message(format!("fetching {flake_ref}"));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.inner.fetch(flake_ref);
        match &result {
            Ok(fetched) => spinner.finish_with_message(format!("fetched {}", fetched.resolved_ref)),
            Err(_) => spinner.abandon_with_message(format!("failed to fetch {flake_ref}")),
        }
        result
    }
}
