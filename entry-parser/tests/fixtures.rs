use pretty_assertions::assert_eq;

use entry_parser::extract_words;

#[test]
fn fixtures_match_expected_output() {
    let cases = [
        (
            "hundo",
            include_str!("fixtures/html/hundo.html"),
            include_str!("fixtures/expected/hundo.txt"),
        ),
        (
            "slash-variants",
            include_str!("fixtures/html/slash-variants.html"),
            include_str!("fixtures/expected/slash-variants.txt"),
        ),
        (
            "no-entry",
            include_str!("fixtures/html/no-entry.html"),
            include_str!("fixtures/expected/no-entry.txt"),
        ),
    ];

    for (name, html, expected) in cases {
        let actual = extract_words(html).into_iter().collect::<Vec<_>>().join("\n");
        assert_eq!(
            actual,
            expected.trim_end_matches('\n'),
            "fixture mismatch: {name}"
        );
    }
}

#[test]
fn extraction_is_repeatable() {
    let html = include_str!("fixtures/html/hundo.html");
    assert_eq!(extract_words(html), extract_words(html));
}
