//! Esperanto alphabetical order.
//!
//! Words compare codepoint by codepoint, except that the six circumflexed or
//! breved letters sort immediately after their base letter: `c < ĉ < d`,
//! `g < ĝ < h`, `h < ĥ < i`, `j < ĵ < k`, `s < ŝ < t`, `u < ŭ < v`.

use std::cmp::Ordering;

/// Letters that sort half a step after their base letter.
const HALF_STEP_LETTERS: [(char, char); 12] = [
    ('Ĉ', 'C'),
    ('Ĝ', 'G'),
    ('Ĥ', 'H'),
    ('Ĵ', 'J'),
    ('Ŝ', 'S'),
    ('Ŭ', 'U'),
    ('ĉ', 'c'),
    ('ĝ', 'g'),
    ('ĥ', 'h'),
    ('ĵ', 'j'),
    ('ŝ', 's'),
    ('ŭ', 'u'),
];

/// Collation weight of a single character.
///
/// Weights are doubled codepoints so the half step stays integral: an
/// ordinary character weighs `2 * cp`, a half-step letter `2 * base + 1`.
pub fn char_weight(ch: char) -> u32 {
    HALF_STEP_LETTERS
        .iter()
        .find(|(letter, _)| *letter == ch)
        .map(|(_, base)| u32::from(*base) * 2 + 1)
        .unwrap_or_else(|| u32::from(ch) * 2)
}

/// Sort key for a whole word; keys compare positionally.
pub fn sort_key(word: &str) -> Vec<u32> {
    word.chars().map(char_weight).collect()
}

/// Compares two words in Esperanto order.
pub fn compare(left: &str, right: &str) -> Ordering {
    left.chars()
        .map(char_weight)
        .cmp(right.chars().map(char_weight))
}

/// Returns the words sorted in Esperanto order.
pub fn esort<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut sorted: Vec<String> = words.into_iter().map(Into::into).collect();
    sorted.sort_by_cached_key(|word| sort_key(word));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circumflexed_letter_sorts_between_base_and_next() {
        assert_eq!(
            esort(["ĉokolado", "cokolado", "dokolado"]),
            vec!["cokolado", "ĉokolado", "dokolado"]
        );
    }

    #[test]
    fn every_half_step_letter_sits_after_its_base() {
        for (letter, base) in HALF_STEP_LETTERS {
            let next = char::from_u32(u32::from(base) + 1).expect("next letter");
            assert!(char_weight(base) < char_weight(letter), "{base} < {letter}");
            assert!(char_weight(letter) < char_weight(next), "{letter} < {next}");
        }
    }

    #[test]
    fn prefixes_sort_first() {
        assert_eq!(compare("hund", "hundo"), Ordering::Less);
        assert_eq!(compare("ŝi", "ŝi"), Ordering::Equal);
        assert_eq!(esort(["sxipo", "ŝipo", "tablo"]), vec!["sxipo", "ŝipo", "tablo"]);
    }

    #[test]
    fn uppercase_keeps_codepoint_order() {
        assert_eq!(esort(["ĉapo", "Ĉapo", "Capo"]), vec!["Capo", "Ĉapo", "ĉapo"]);
    }
}
