//! Crawl settings and the command-line interface that builds them.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Word searched first on a fresh run.
pub const DEFAULT_SEED: &str = "ktp";
/// Search URL; `{word}` is replaced by the percent-encoded word.
pub const DEFAULT_URL_TEMPLATE: &str = "https://vortaro.net/?s={word}";

/// Tunable knobs that bound crawl behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrawlControls {
    output_dir: PathBuf,
    seed: String,
    save_html: bool,
    politeness_delay: Duration,
    fetch_timeout: Duration,
    url_template: String,
    checkpoint_every: usize,
    replay_archive: Option<PathBuf>,
}

impl CrawlControls {
    /// Directory holding the checkpoint files and the raw archive.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Word queued on a fresh run.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Whether every found document is archived verbatim.
    pub fn save_html(&self) -> bool {
        self.save_html
    }

    /// Pause between two fetches.
    pub fn politeness_delay(&self) -> Duration {
        self.politeness_delay
    }

    /// Upper bound for one fetch.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Search URL template.
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Iterations between intermediate checkpoints; 0 saves only at the end.
    pub fn checkpoint_every(&self) -> usize {
        self.checkpoint_every
    }

    /// Archive directory to replay instead of fetching from the network.
    pub fn replay_archive(&self) -> Option<&Path> {
        self.replay_archive.as_deref()
    }

    /// Returns a copy writing into `output_dir`.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Returns a copy with another seed word.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Returns a copy with archiving switched on or off.
    pub fn with_save_html(mut self, save_html: bool) -> Self {
        self.save_html = save_html;
        self
    }

    /// Returns a copy with another politeness delay.
    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    /// Returns a copy with another checkpoint cadence.
    pub fn with_checkpoint_every(mut self, iterations: usize) -> Self {
        self.checkpoint_every = iterations;
        self
    }

    /// Returns a copy replaying the given archive directory.
    pub fn with_replay_archive(mut self, dir: impl Into<PathBuf>) -> Self {
        self.replay_archive = Some(dir.into());
        self
    }
}

impl Default for CrawlControls {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
            seed: DEFAULT_SEED.to_string(),
            save_html: true,
            politeness_delay: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(5),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            checkpoint_every: 0,
            replay_archive: None,
        }
    }
}

/// Command-line interface of the crawler.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "vortcrawl",
    about = "Harvest every headword reachable from a seed word in the online dictionary"
)]
pub struct Cli {
    /// Directory for checkpoint files and archived entries
    #[arg(long, env = "VORTCRAWL_OUTPUT_DIR", default_value = "results")]
    pub output_dir: PathBuf,

    /// Archive every fetched entry under <output-dir>/html
    #[arg(
        long,
        env = "VORTCRAWL_SAVE_HTML",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub save_html: bool,

    /// Word searched first when no checkpoint exists
    #[arg(long, env = "VORTCRAWL_SEED", default_value = DEFAULT_SEED)]
    pub seed: String,

    /// Milliseconds to wait between two searches
    #[arg(long, env = "VORTCRAWL_POLITENESS_MS", default_value_t = 1000)]
    pub politeness_ms: u64,

    /// Seconds to wait for one search before giving up on the run
    #[arg(long, env = "VORTCRAWL_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,

    /// Search URL, `{word}` is replaced by the word
    #[arg(long, env = "VORTCRAWL_URL_TEMPLATE", default_value = DEFAULT_URL_TEMPLATE)]
    pub url_template: String,

    /// Save the checkpoint every N searches (0 = only when the run ends)
    #[arg(long, env = "VORTCRAWL_CHECKPOINT_EVERY", default_value_t = 0)]
    pub checkpoint_every: usize,

    /// Replay entries from an archive directory instead of searching online
    #[arg(long, env = "VORTCRAWL_REPLAY_ARCHIVE")]
    pub replay_archive: Option<PathBuf>,
}

impl Cli {
    /// Converts the parsed CLI into `CrawlControls`.
    pub fn build_controls(&self) -> CrawlControls {
        CrawlControls {
            output_dir: self.output_dir.clone(),
            seed: self.seed.trim().to_lowercase(),
            save_html: self.save_html,
            politeness_delay: Duration::from_millis(self.politeness_ms),
            fetch_timeout: Duration::from_secs(self.timeout_secs.max(1)),
            url_template: self.url_template.clone(),
            checkpoint_every: self.checkpoint_every,
            replay_archive: self.replay_archive.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let cli = Cli::parse_from(["vortcrawl"]);
        assert_eq!(cli.build_controls(), CrawlControls::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "vortcrawl",
            "--output-dir",
            "out",
            "--save-html",
            "false",
            "--seed",
            " Hundo ",
            "--politeness-ms",
            "0",
            "--checkpoint-every",
            "50",
            "--replay-archive",
            "old/html",
        ]);
        let controls = cli.build_controls();

        assert_eq!(controls.output_dir(), Path::new("out"));
        assert!(!controls.save_html());
        assert_eq!(controls.seed(), "hundo");
        assert_eq!(controls.politeness_delay(), Duration::ZERO);
        assert_eq!(controls.checkpoint_every(), 50);
        assert_eq!(controls.replay_archive(), Some(Path::new("old/html")));
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let cli = Cli::parse_from(["vortcrawl", "--timeout-secs", "0"]);
        assert_eq!(cli.build_controls().fetch_timeout(), Duration::from_secs(1));
    }
}
