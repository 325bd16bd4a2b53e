//! Extract candidate words from a dictionary entry document.
//!
//! A fetched entry contains headwords, derived forms and definition text.
//! Decorative inline elements (symbols, abbreviations, footnote markers) are
//! removed first, then every headword and every word used in the sense and
//! derivation containers is collected. Words are case-folded.

use ego_tree::NodeId;
use regex::Regex;
use scraper::node::Element;
use scraper::{ElementRef, Html};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Decimal digits plus the enclosed digits the dictionary numbers senses with.
const DIGIT_PATTERN: &str = r"[\d①-⑨]";

/// How an element's `class` attribute is matched.
#[derive(Debug, Clone)]
pub enum ClassMatch {
    /// One of the whitespace-separated class names equals the value.
    Token(String),
    /// The whole attribute value equals the value.
    Attribute(String),
    /// The pattern matches one of the class names or the whole attribute value.
    Pattern(Regex),
}

impl ClassMatch {
    /// Compiles a pattern rule.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    fn matches(&self, element: &Element) -> bool {
        let Some(attribute) = element.attr("class") else {
            return false;
        };
        match self {
            Self::Token(name) => element.classes().any(|class| class == name),
            Self::Attribute(value) => attribute == value,
            Self::Pattern(regex) => {
                element.classes().any(|class| regex.is_match(class)) || regex.is_match(attribute)
            }
        }
    }
}

/// Selects elements by optional tag name plus a class rule.
#[derive(Debug, Clone)]
pub struct ElementRule {
    tag: Option<String>,
    class: ClassMatch,
}

impl ElementRule {
    /// Matches elements with the given tag and class rule.
    pub fn tagged(tag: &str, class: ClassMatch) -> Self {
        Self {
            tag: Some(tag.to_string()),
            class,
        }
    }

    /// Matches elements of any tag with the given class rule.
    pub fn any_tag(class: ClassMatch) -> Self {
        Self { tag: None, class }
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag.as_deref().map_or(true, |tag| element.name() == tag) && self.class.matches(element)
    }
}

/// Markup rules describing where words live inside an entry.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    /// Inline decorations removed before anything else is read.
    pub decoration: ElementRule,
    /// Headword elements.
    pub headword: ElementRule,
    /// Sense/definition containers whose text is tokenized.
    pub sense: ElementRule,
    /// Derivation containers.
    pub derivation: ElementRule,
    /// Derived-form headwords inside a derivation container.
    pub derived_form: ElementRule,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            decoration: ElementRule::any_tag(
                ClassMatch::pattern("tooltipstered").expect("valid decoration pattern"),
            ),
            headword: ElementRule::tagged("strong", ClassMatch::Token("kapvorto".to_string())),
            sense: ElementRule::tagged("div", ClassMatch::Attribute("div senco".to_string())),
            derivation: ElementRule::tagged(
                "div",
                ClassMatch::pattern("div derivajho").expect("valid derivation pattern"),
            ),
            derived_form: ElementRule::tagged(
                "strong",
                ClassMatch::pattern("^d").expect("valid derived form pattern"),
            ),
        }
    }
}

/// Stateless extractor applying a set of [`ExtractionRules`].
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    rules: ExtractionRules,
}

impl Extractor {
    /// Builds an extractor around the provided rules.
    pub fn new(rules: ExtractionRules) -> Self {
        Self { rules }
    }

    /// Returns the configured rules.
    pub fn rules(&self) -> &ExtractionRules {
        &self.rules
    }

    /// Extracts every candidate word from one entry document.
    ///
    /// A headword written as `hundo/hundino` is kept as the single token
    /// `hundohundino`: the variant separator is removed, the variants are not
    /// split apart.
    ///
    /// ```
    /// use entry_parser::Extractor;
    ///
    /// let html = r#"<strong class="kapvorto">Hund/o</strong>"#;
    /// let words = Extractor::default().extract(html);
    /// assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["hundo".to_string()]);
    /// ```
    pub fn extract(&self, html: &str) -> BTreeSet<String> {
        let mut document = Html::parse_fragment(html);
        let decorations = matching_ids(&document, &self.rules.decoration);
        detach_all(&mut document, decorations);

        let mut words = BTreeSet::new();
        for headword in matching(&document, &self.rules.headword) {
            insert_headword(&mut words, &headword);
        }
        for sense in matching(&document, &self.rules.sense) {
            words.extend(split_into_words(&element_text(&sense)));
        }

        for derivation_id in matching_ids(&document, &self.rules.derivation) {
            let Some(derivation) = element_by_id(&document, derivation_id) else {
                continue;
            };
            let mut forms = Vec::new();
            for form in derivation.descendants().filter_map(ElementRef::wrap) {
                if form.id() != derivation_id && self.rules.derived_form.matches(form.value()) {
                    insert_headword(&mut words, &form);
                    forms.push(form.id());
                }
            }
            detach_all(&mut document, forms);

            if let Some(derivation) = element_by_id(&document, derivation_id) {
                words.extend(split_into_words(&element_text(&derivation)));
            }
        }

        words
    }
}

/// Extracts words using the default dictionary markup rules.
pub fn extract_words(html: &str) -> BTreeSet<String> {
    Extractor::default().extract(html)
}

/// Splits free text into candidate words.
///
/// Text is split on every character that is neither alphanumeric nor `-`.
/// Hyphenated pieces are kept whole and also split into their parts.
pub fn split_into_words(text: &str) -> BTreeSet<String> {
    let text = text.to_lowercase();
    let mut words = BTreeSet::new();
    for piece in text.split(|ch: char| !is_word_char(ch)) {
        if piece.contains('-') {
            words.extend(
                piece
                    .split('-')
                    .filter(|part| is_valid_word(part))
                    .map(str::to_string),
            );
        }
        if is_valid_word(piece) {
            words.insert(piece.to_string());
        }
    }
    words
}

/// Rejects empty pieces, a lone hyphen, and anything containing a decimal
/// digit or an enclosed sense number `①`..`⑨`.
///
/// Other numeric characters such as `½` or `²` are part of the word.
pub fn is_valid_word(word: &str) -> bool {
    if word.is_empty() || word == "-" {
        return false;
    }
    !digit_pattern().is_match(word)
}

fn digit_pattern() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(DIGIT_PATTERN).expect("valid digit pattern"))
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-'
}

fn insert_headword(words: &mut BTreeSet<String>, element: &ElementRef<'_>) {
    let headword = element_text(element).replace('/', "").to_lowercase();
    if !headword.is_empty() {
        words.insert(headword);
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

fn matching<'a>(document: &'a Html, rule: &'a ElementRule) -> impl Iterator<Item = ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |element| rule.matches(element.value()))
}

fn matching_ids(document: &Html, rule: &ElementRule) -> Vec<NodeId> {
    matching(document, rule).map(|element| element.id()).collect()
}

fn element_by_id(document: &Html, id: NodeId) -> Option<ElementRef<'_>> {
    document.tree.get(id).and_then(ElementRef::wrap)
}

fn detach_all(document: &mut Html, ids: Vec<NodeId>) {
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_words, is_valid_word, split_into_words, ClassMatch, ElementRule, Extractor};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn slash_joined_headword_is_one_token() {
        let html = r#"<strong class="kapvorto">hundo/hundino</strong>"#;
        assert_eq!(extract_words(html), set(&["hundohundino"]));
    }

    #[test]
    fn decorations_are_removed_before_reading() {
        let html = r#"
        <div class="div senco">
          <abbr class="mll tooltipstered">fig</abbr> granda besto
        </div>
        "#;
        assert_eq!(extract_words(html), set(&["besto", "granda"]));
    }

    #[test]
    fn sense_container_requires_exact_class_attribute() {
        let html = r#"
        <div class="div senco">kato</div>
        <div class="senco div">muso</div>
        "#;
        assert_eq!(extract_words(html), set(&["kato"]));
    }

    #[test]
    fn derived_forms_are_taken_then_removed() {
        let html = r#"
        <div class="div derivajho d1">
          <strong class="drv">Hund/ej/o</strong>
          loĝejo de <em>hundoj</em>
        </div>
        "#;
        assert_eq!(
            extract_words(html),
            set(&["de", "hundejo", "hundoj", "loĝejo"])
        );
    }

    #[test]
    fn headwords_are_case_folded() {
        let html = r#"<p><strong class="kapvorto">Ĉokolad/o</strong></p>"#;
        assert_eq!(extract_words(html), set(&["ĉokolado"]));
    }

    #[test]
    fn text_outside_known_containers_is_ignored() {
        let html = r#"<p>neniu vorto ĉi tie</p><strong>kapo</strong>"#;
        assert!(extract_words(html).is_empty());
    }

    #[test]
    fn custom_rules_are_honoured() {
        let mut rules = super::ExtractionRules::default();
        rules.headword = ElementRule::any_tag(ClassMatch::Token("lemma".to_string()));
        let extractor = Extractor::new(rules);
        let html = r#"<span class="lemma">Domo</span><strong class="kapvorto">kato</strong>"#;
        assert_eq!(extractor.extract(html), set(&["domo"]));
    }

    #[test]
    fn hyphenated_words_keep_whole_and_parts() {
        assert_eq!(
            split_into_words("pli-malpli, ktp."),
            set(&["ktp", "malpli", "pli", "pli-malpli"])
        );
    }

    #[test]
    fn numbered_and_empty_pieces_are_dropped() {
        assert_eq!(split_into_words("① vidu 2a - n-ro"), set(&["n", "n-ro", "ro", "vidu"]));
    }

    #[test]
    fn validity_rules() {
        assert!(!is_valid_word(""));
        assert!(!is_valid_word("-"));
        assert!(!is_valid_word("a1"));
        assert!(!is_valid_word("②"));
        assert!(!is_valid_word("٣a"));
        assert!(is_valid_word("-ist"));
        assert!(is_valid_word("ŝipo"));
    }

    #[test]
    fn empty_headword_adds_nothing() {
        let html = r#"<strong class="kapvorto">/</strong><div class="div senco">vidu</div>"#;
        assert_eq!(extract_words(html), set(&["vidu"]));
    }

    #[test]
    fn fractions_and_superscripts_stay_in_words() {
        assert_eq!(
            split_into_words("½exp km² ⑩ ① vidu"),
            set(&["km²", "vidu", "½exp", "⑩"])
        );
    }
}
