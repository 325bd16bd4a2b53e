//! Crawl engine: the fetch → extract → merge loop over the frontier.

use crate::checkpoint::{Archive, CheckpointError, CheckpointStore};
use crate::controls::CrawlControls;
use crate::fetch::{ArchiveFetcher, FetchError, FetchOutcome, Fetcher, HttpFetcher};
use crate::frontier::{FrontierState, MergeStats};
use entry_parser::Extractor;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::Builder;
use tokio::time::sleep;

/// Turns one fetched document into candidate words.
pub trait Extract {
    /// Candidate words of `document`, in a deterministic order.
    fn extract(&self, document: &str) -> BTreeSet<String>;
}

impl Extract for Extractor {
    fn extract(&self, document: &str) -> BTreeSet<String> {
        Extractor::extract(self, document)
    }
}

/// Why a crawl loop stopped without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The frontier is empty.
    Exhausted,
    /// Shutdown was requested.
    Interrupted {
        /// In-flight word, already back at the front of the frontier.
        word: Option<String>,
    },
}

/// Fatal crawl failures. The in-flight word is back in the frontier when
/// one of these is returned.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Searching a word failed without a confirmed absence.
    #[error("fetching {word:?} failed ({}): {source}", .source.class())]
    Fetch {
        /// Word being searched.
        word: String,
        /// Fetch failure.
        source: FetchError,
    },
    /// The fetched document could not be archived.
    #[error("archiving {word:?} failed: {source}")]
    Archive {
        /// Word whose document was being archived.
        word: String,
        /// Write failure.
        source: CheckpointError,
    },
    /// An intermediate checkpoint could not be written.
    #[error("intermediate checkpoint failed: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl CrawlError {
    /// Word that was in flight, if the failure concerned one.
    pub fn word(&self) -> Option<&str> {
        match self {
            Self::Fetch { word, .. } | Self::Archive { word, .. } => Some(word),
            Self::Checkpoint(_) => None,
        }
    }
}

/// Running mean of iteration durations, used to estimate the time left.
#[derive(Debug, Clone, Copy, Default)]
pub struct EtaEstimator {
    iterations: u32,
    mean: Duration,
}

impl EtaEstimator {
    /// Folds one iteration duration into the mean.
    pub fn record(&mut self, elapsed: Duration) {
        let total = self.mean * self.iterations + elapsed;
        self.iterations = self.iterations.saturating_add(1);
        self.mean = total / self.iterations;
    }

    /// Mean duration so far.
    pub fn mean(&self) -> Duration {
        self.mean
    }

    /// Estimated time to drain `pending` more words. Purely advisory.
    pub fn remaining(&self, pending: usize) -> Duration {
        self.mean
            .checked_mul(u32::try_from(pending).unwrap_or(u32::MAX))
            .unwrap_or(Duration::MAX)
    }
}

/// Formats a duration as `H:MM:SS`.
pub fn format_eta(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Counters collected over one crawl run.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pages_fetched: usize,
    words_not_found: usize,
    words_discovered: usize,
    words_enqueued: usize,
    duplicates_skipped: usize,
}

impl Metrics {
    fn record_found(&mut self, merge: MergeStats) {
        self.pages_fetched += 1;
        self.words_discovered += merge.discovered;
        self.words_enqueued += merge.enqueued;
        self.duplicates_skipped += merge.duplicates();
    }

    fn record_not_found(&mut self) {
        self.words_not_found += 1;
    }

    /// Documents fetched with an entry.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Words the source had no entry for.
    pub fn words_not_found(&self) -> usize {
        self.words_not_found
    }

    /// Candidate words extracted, duplicates included.
    pub fn words_discovered(&self) -> usize {
        self.words_discovered
    }

    /// Candidates that joined the frontier.
    pub fn words_enqueued(&self) -> usize {
        self.words_enqueued
    }

    /// Candidates dropped because they were already known.
    pub fn duplicates_skipped(&self) -> usize {
        self.duplicates_skipped
    }

    /// Prints a summary of the run.
    pub fn report(&self, elapsed: Duration) {
        let secs = elapsed.as_secs_f32().max(f32::EPSILON);
        let searched = self.pages_fetched + self.words_not_found;
        println!("--- crawl metrics ({secs:.2}s) ---");
        println!("entries fetched: {}", self.pages_fetched);
        println!("words without entry: {}", self.words_not_found);
        println!("searches/sec: {:.2}", searched as f32 / secs);
        println!("words discovered: {}", self.words_discovered);
        println!("words enqueued: {}", self.words_enqueued);
        println!("duplicate skips: {}", self.duplicates_skipped);
    }
}

/// Drives the crawl loop for one fetcher/extractor pair.
pub struct Crawler<F, X> {
    fetcher: F,
    extractor: X,
    controls: CrawlControls,
    store: Option<CheckpointStore>,
    archive: Option<Archive>,
    metrics: Metrics,
    eta: EtaEstimator,
}

impl<F: Fetcher, X: Extract> Crawler<F, X> {
    /// Creates a crawler without archiving or intermediate checkpoints.
    pub fn new(fetcher: F, extractor: X, controls: CrawlControls) -> Self {
        Self {
            fetcher,
            extractor,
            controls,
            store: None,
            archive: None,
            metrics: Metrics::default(),
            eta: EtaEstimator::default(),
        }
    }

    /// Enables intermediate checkpoints (see [`CrawlControls::checkpoint_every`])
    /// and, when the controls ask for it, archiving into the store's directory.
    pub fn with_store(mut self, store: CheckpointStore) -> Self {
        if self.controls.save_html() {
            self.archive = Some(store.archive());
        }
        self.store = Some(store);
        self
    }

    /// Counters collected so far.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Progress estimator.
    pub fn eta(&self) -> &EtaEstimator {
        &self.eta
    }

    /// Runs until the frontier is empty, `shutdown` completes, or a fatal error occurs.
    ///
    /// Exactly one fetch is in flight at a time. Whatever happens, the word
    /// being processed is either classified or back at the front of
    /// `pending` when this returns.
    pub async fn run<S>(
        &mut self,
        state: &mut FrontierState,
        shutdown: S,
    ) -> Result<StopReason, CrawlError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut iterations = 0usize;

        while let Some(word) = state.next_pending() {
            let started = Instant::now();
            let fetched = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("interrupted while searching {word:?}; returned it to the frontier");
                    state.restore(word.clone());
                    return Ok(StopReason::Interrupted { word: Some(word) });
                }
                fetched = self.fetcher.fetch(&word) => fetched,
            };

            match fetched {
                Ok(FetchOutcome::Found(document)) => {
                    if let Some(archive) = &self.archive {
                        if let Err(source) = archive.store(&word, &document) {
                            state.restore(word.clone());
                            return Err(CrawlError::Archive { word, source });
                        }
                    }
                    let discovered = self.extractor.extract(&document);
                    debug!("{word}: found, {} candidates", discovered.len());
                    let merge = state.mark_completed(word, discovered);
                    self.metrics.record_found(merge);
                }
                Ok(FetchOutcome::NotFound) => {
                    debug!("{word}: no entry");
                    state.mark_unresolved(word);
                    self.metrics.record_not_found();
                }
                Err(source) => {
                    state.restore(word.clone());
                    return Err(CrawlError::Fetch { word, source });
                }
            }

            self.eta.record(started.elapsed());
            info!(
                "not_yet: {}, done: {}, no_results: {} (remaining {})",
                state.pending_len(),
                state.completed_len(),
                state.unresolved_len(),
                format_eta(self.eta.remaining(state.pending_len()))
            );

            iterations += 1;
            let every = self.controls.checkpoint_every();
            if let Some(store) = &self.store {
                if every > 0 && iterations % every == 0 {
                    store.save(state)?;
                }
            }

            let delay = self.controls.politeness_delay();
            if state.pending_len() > 0 && !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        warn!("interrupted between searches");
                        return Ok(StopReason::Interrupted { word: None });
                    }
                    _ = sleep(delay) => {}
                }
            }
        }

        Ok(StopReason::Exhausted)
    }
}

/// Failures of a whole crawl run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The async runtime could not start.
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    /// Loading or saving the checkpoint failed.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    /// The crawl loop hit a fatal error.
    #[error(transparent)]
    Crawl(#[from] CrawlError),
}

/// Entry point used by the binary: load, crawl until done or interrupted, save.
pub fn run(controls: CrawlControls) -> Result<StopReason, RunError> {
    let rt = Builder::new_current_thread().enable_all().build()?;
    rt.block_on(run_until_interrupted(controls))
}

async fn run_until_interrupted(controls: CrawlControls) -> Result<StopReason, RunError> {
    match controls.replay_archive() {
        Some(dir) => {
            info!("replaying archived entries from {}", dir.display());
            let fetcher = ArchiveFetcher::new(dir);
            crawl_with(fetcher, controls.clone(), interrupt_signal()).await
        }
        None => {
            let fetcher = HttpFetcher::new(&controls)?;
            crawl_with(fetcher, controls.clone(), interrupt_signal()).await
        }
    }
}

/// Loads the checkpoint for `controls`, crawls, and always saves the result.
pub async fn crawl_with<F, S>(
    fetcher: F,
    controls: CrawlControls,
    shutdown: S,
) -> Result<StopReason, RunError>
where
    F: Fetcher,
    S: Future<Output = ()>,
{
    let store = CheckpointStore::new(controls.output_dir());
    let mut state = store.load()?;
    if state.seed_if_fresh(controls.seed()) {
        info!("fresh run, seeded with {:?}", controls.seed());
    }

    let start = Instant::now();
    let mut crawler =
        Crawler::new(fetcher, Extractor::default(), controls).with_store(store.clone());
    let outcome = crawler.run(&mut state, shutdown).await;

    let saved = store.save(&state);
    if let Err(err) = &saved {
        error!("failed to save checkpoint: {err}");
    }
    crawler.metrics().report(start.elapsed());

    match &outcome {
        Ok(StopReason::Exhausted) => info!("frontier exhausted"),
        Ok(StopReason::Interrupted { word }) => {
            info!("interrupted (in-flight word: {word:?}); rerun to resume")
        }
        Err(err) => error!(
            "crawl stopped on {:?}: {err}",
            err.word().unwrap_or("<between searches>")
        ),
    }
    let stop = outcome?;
    saved?;
    Ok(stop)
}

async fn interrupt_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("cannot listen for interrupts: {err}");
        std::future::pending::<()>().await;
    }
}
