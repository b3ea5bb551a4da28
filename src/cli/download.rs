//! Download command implementation

use clap::Parser;
use futures_util::stream;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::validate::ensure_valid_credential;
use super::{Cli, CliError, ListingArgs};
use crate::api::PaginationHelper;
use crate::downloader::config::DEFAULT_ITEM_DELAY;
use crate::downloader::prompt::{FixedAnswer, OverwritePrompt, StdinPrompt};
use crate::downloader::{BatchThrottler, DownloadOptions, DownloadOutcome, ReplayDownloader};

/// Download every replay of a listing into a directory
#[derive(Parser, Debug)]
pub struct DownloadCommand {
    /// Replay selection
    #[command(flatten)]
    pub listing: ListingArgs,

    /// Directory receiving {id}.replay files (created if missing)
    #[arg(long, short = 'o')]
    pub output_dir: PathBuf,

    /// Pause after each replay in milliseconds, also added to every rate-limit wait
    #[arg(long, default_value_t = DEFAULT_ITEM_DELAY.as_millis() as u64)]
    pub delay: u64,

    /// Replace existing replay files without asking
    #[arg(long, conflicts_with = "keep_existing")]
    pub overwrite: bool,

    /// Keep existing replay files without asking
    #[arg(long)]
    pub keep_existing: bool,

    /// Answer yes to every overwrite question
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Terminal prompt that hides the progress bar while waiting for an answer
struct ProgressPrompt {
    bar: ProgressBar,
}

impl OverwritePrompt for ProgressPrompt {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        self.bar.suspend(|| StdinPrompt.confirm_overwrite(path))
    }
}

impl DownloadCommand {
    /// Options for the single-replay downloader
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions::new(&self.output_dir)
            .with_item_delay(Duration::from_millis(self.delay))
            .with_overwrite(self.overwrite)
            .with_keep_existing(self.keep_existing)
    }

    /// Execute the download command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let client = cli.http_client()?;
        ensure_valid_credential(&client).await?;

        let start_url = self.listing.start_url(&client);
        let ids = PaginationHelper::collect_replay_ids(&client, start_url).await?;
        info!(
            "Found {} replay(s), downloading to {}",
            ids.len(),
            self.output_dir.display()
        );

        let bar = create_progress_bar(ids.len() as u64);
        let prompt: Arc<dyn OverwritePrompt> = if self.yes {
            Arc::new(FixedAnswer(true))
        } else {
            Arc::new(ProgressPrompt { bar: bar.clone() })
        };

        let downloader =
            ReplayDownloader::new(client, self.download_options()).with_prompt(prompt);
        let mut throttler = BatchThrottler::new(downloader);

        let summary = throttler
            .run_with(stream::iter(ids), |id, outcome| {
                let label = match outcome {
                    DownloadOutcome::Downloaded { .. } => "downloaded",
                    DownloadOutcome::Skipped => "kept",
                };
                bar.set_message(format!("{label} {id}"));
                bar.inc(1);
            })
            .await?;
        bar.finish_and_clear();

        println!(
            "Downloaded {} replay(s), kept {} existing file(s) in {}",
            summary.downloaded,
            summary.skipped,
            self.output_dir.display()
        );
        Ok(())
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("hardcoded template is valid")
            .progress_chars("#>-"),
    );
    pb
}
