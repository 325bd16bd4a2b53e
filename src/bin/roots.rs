use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use vortcrawl::checkpoint::{read_words, save_words, DONE_FILE, PREPROCESSED_FILE, ROOTS_FILE};
use vortcrawl::{NormalizationRules, Normalizer};

#[derive(Parser, Debug)]
#[command(
    name = "vortcrawl-roots",
    about = "Collapse harvested headwords into their grammatical roots"
)]
struct RootsCli {
    /// Directory holding done.txt; the root list is written next to it.
    #[arg(long, env = "VORTCRAWL_RESULT_DIR", default_value = "results")]
    result_dir: PathBuf,

    /// JSON rules file overriding the built-in tables.
    #[arg(long, env = "VORTCRAWL_RULES")]
    rules: Option<PathBuf>,

    /// Normalize done.txt as is, without the preprocess pass.
    #[arg(long, default_value_t = false)]
    skip_preprocess: bool,

    /// Also save the preprocessed word list.
    #[arg(long, default_value_t = false)]
    write_preprocessed: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = RootsCli::parse();

    let rules = match &cli.rules {
        Some(path) => NormalizationRules::load(path)?,
        None => NormalizationRules::default(),
    };
    let normalizer = Normalizer::new(rules);

    let done_path = cli.result_dir.join(DONE_FILE);
    let words = read_words(&done_path)?;
    info!("read {} words from {}", words.len(), done_path.display());

    let words = if cli.skip_preprocess {
        words
    } else {
        let preprocessed = normalizer.preprocess(&words);
        if cli.write_preprocessed {
            let path = cli.result_dir.join(PREPROCESSED_FILE);
            let written = save_words(preprocessed.iter().cloned(), &path)
                .with_context(|| format!("saving preprocessed words to {}", path.display()))?;
            info!("wrote {written} preprocessed words to {}", path.display());
        }
        preprocessed
    };

    let roots = normalizer.normalize(&words);
    let roots_path = cli.result_dir.join(ROOTS_FILE);
    let written = save_words(roots, &roots_path)?;
    info!(
        "reduced {} words to {written} roots in {}",
        words.len(),
        roots_path.display()
    );
    Ok(())
}
