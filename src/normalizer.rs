//! Reduction of harvested surface forms to their grammatical roots.
//!
//! Three passes, each driven by data rather than code:
//! 1. [`PreprocessRules`] drop known-bad tokens and strip stray characters.
//! 2. [`TokenFilter`] rejects malformed tokens.
//! 3. [`RootRules`] map each surviving word to its root: invariant
//!    particles stay as they are, correlatives collapse to their stem, and
//!    anything else loses its longest matching grammatical ending.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const STANDALONE_WORDS: &[&str] = &[
    "ajn", "ĉi", "ĉu", "do", "ja", "jen", "ju", "kaj", "ne", "nun", "plej", "pli", "plu", "tamen",
    "tre", "tro", "tuj",
];
const CORRELATIVE_STEMS: &[&str] = &[
    "kia", "tia", "ia", "ĉia", "nenia", "kie", "tie", "ie", "ĉie", "nenie", "kio", "tio", "io",
    "ĉio", "nenio", "kiu", "tiu", "iu", "ĉiu", "neniu",
];
const CORRELATIVE_SUFFIXES: &[&str] = &["", "j", "jn", "n"];
const GRAMMATICAL_ENDINGS: &[&str] = &[
    "o", "oj", "ojn", "on", "a", "aj", "ajn", "an", "e", "en", "i", "as", "is", "os", "us", "u",
];
const PREPROCESS_BLOCKLIST: &[&str] = &["-½exp", "½exp", "å", "être"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Inclusive character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharRange {
    /// First character of the range.
    pub start: char,
    /// Last character of the range.
    pub end: char,
}

impl CharRange {
    fn contains(&self, ch: char) -> bool {
        (self.start..=self.end).contains(&ch)
    }
}

/// Cleanup applied to the raw completed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessRules {
    /// Tokens dropped outright.
    pub blocklist: BTreeSet<String>,
    /// Characters removed from every remaining token.
    pub strip_chars: Vec<char>,
}

impl Default for PreprocessRules {
    fn default() -> Self {
        Self {
            blocklist: owned(PREPROCESS_BLOCKLIST).into_iter().collect(),
            strip_chars: vec!['?'],
        }
    }
}

/// Predicate separating plausible words from malformed tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenFilter {
    /// Minimum length in characters.
    pub min_chars: usize,
    /// Tokens containing any character of these ranges are rejected.
    pub forbidden_ranges: Vec<CharRange>,
    /// Reject tokens containing whitespace.
    pub reject_whitespace: bool,
}

impl Default for TokenFilter {
    fn default() -> Self {
        Self {
            min_chars: 2,
            // space through period, which covers punctuation and the hyphen
            forbidden_ranges: vec![CharRange {
                start: ' ',
                end: '.',
            }],
            reject_whitespace: true,
        }
    }
}

impl TokenFilter {
    /// True when `word` passes the filter.
    pub fn accepts(&self, word: &str) -> bool {
        word.chars().count() >= self.min_chars
            && !word.chars().any(|ch| {
                (self.reject_whitespace && ch.is_whitespace())
                    || self.forbidden_ranges.iter().any(|range| range.contains(ch))
            })
    }
}

/// Closed word classes and endings used to derive roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootRules {
    /// Invariant particles kept verbatim.
    pub standalone_words: BTreeSet<String>,
    /// Correlative stems.
    pub correlative_stems: Vec<String>,
    /// Endings a correlative may carry, including the empty one.
    pub correlative_suffixes: Vec<String>,
    /// Only collapse words that are exactly stem plus suffix. Off by default:
    /// any word ending in a correlative collapses to that correlative's stem.
    pub correlative_whole_word: bool,
    /// Part-of-speech endings; matched longest first regardless of order here.
    pub endings: Vec<String>,
}

impl Default for RootRules {
    fn default() -> Self {
        Self {
            standalone_words: owned(STANDALONE_WORDS).into_iter().collect(),
            correlative_stems: owned(CORRELATIVE_STEMS),
            correlative_suffixes: owned(CORRELATIVE_SUFFIXES),
            correlative_whole_word: false,
            endings: owned(GRAMMATICAL_ENDINGS),
        }
    }
}

/// Complete rule set; every section falls back to the built-in tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationRules {
    /// Preprocess pass.
    pub preprocess: PreprocessRules,
    /// Malformed-token filter.
    pub filter: TokenFilter,
    /// Root derivation tables.
    pub roots: RootRules,
}

/// Errors surfaced while loading a rules file.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The file could not be read.
    #[error("failed to read rules {path:?}: {source}")]
    Read {
        /// Rules file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file is not a valid rules document.
    #[error("invalid rules in {path:?}: {source}")]
    Parse {
        /// Rules file.
        path: PathBuf,
        /// JSON error.
        source: serde_json::Error,
    },
}

impl NormalizationRules {
    /// Reads a JSON rules document; omitted fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let text = fs::read_to_string(path).map_err(|source| RulesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| RulesError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Stateless root derivation service.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: NormalizationRules,
    endings_longest_first: Vec<String>,
}

impl Normalizer {
    /// Builds a normalizer from a rule set.
    pub fn new(rules: NormalizationRules) -> Self {
        let mut endings_longest_first: Vec<String> = rules
            .roots
            .endings
            .iter()
            .filter(|ending| !ending.is_empty())
            .cloned()
            .collect();
        endings_longest_first.sort_by_key(|ending| std::cmp::Reverse(ending.chars().count()));
        Self {
            rules,
            endings_longest_first,
        }
    }

    /// Returns the underlying rules.
    pub fn rules(&self) -> &NormalizationRules {
        &self.rules
    }

    /// Drops blocklisted tokens and strips the configured characters.
    pub fn preprocess<I, S>(&self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = &self.rules.preprocess;
        words
            .into_iter()
            .filter(|word| !rules.blocklist.contains(word.as_ref()))
            .map(|word| {
                word.as_ref()
                    .chars()
                    .filter(|ch| !rules.strip_chars.contains(ch))
                    .collect()
            })
            .collect()
    }

    /// True when `word` survives the malformed-token filter.
    pub fn is_valid(&self, word: &str) -> bool {
        self.rules.filter.accepts(word)
    }

    /// Root of a single word.
    pub fn root_of<'a>(&self, word: &'a str) -> &'a str {
        let rules = &self.rules.roots;
        if rules.standalone_words.contains(word) {
            return word;
        }
        if let Some(stem) = self.correlative_stem(word) {
            return stem;
        }
        self.endings_longest_first
            .iter()
            .find(|ending| word.len() > ending.len() && word.ends_with(ending.as_str()))
            .map(|ending| &word[..word.len() - ending.len()])
            .unwrap_or(word)
    }

    /// Filters the words and collapses them into their set of roots.
    pub fn normalize<I, S>(&self, words: I) -> HashSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        words
            .into_iter()
            .filter(|word| self.is_valid(word.as_ref()))
            .map(|word| self.root_of(word.as_ref()).to_string())
            .collect()
    }

    fn correlative_stem<'a>(&self, word: &'a str) -> Option<&'a str> {
        if self.rules.roots.correlative_whole_word {
            return self.whole_correlative(word);
        }
        word.char_indices()
            .find_map(|(start, _)| self.whole_correlative(&word[start..]))
    }

    /// Longest stem such that `tail` is exactly that stem plus an allowed suffix.
    fn whole_correlative<'a>(&self, tail: &'a str) -> Option<&'a str> {
        let rules = &self.rules.roots;
        rules
            .correlative_stems
            .iter()
            .filter(|stem| {
                tail.strip_prefix(stem.as_str()).is_some_and(|suffix| {
                    rules
                        .correlative_suffixes
                        .iter()
                        .any(|allowed| allowed == suffix)
                })
            })
            .map(|stem| stem.len())
            .max()
            .map(|len| &tail[..len])
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizationRules::default())
    }
}
