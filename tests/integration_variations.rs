#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Realistic model outputs run through the public variation parser

use adnova::artifacts::GeneratedAd;
use adnova::variations::{
    FAILED_VARIATION_PLACEHOLDER, ParseStrategy, parse_variations, parse_variations_detailed,
};

#[test]
fn chatty_model_output_with_headers() {
    let output = "Sure! Here are three variations for your campaign.\n\
\n\
Variation 1:\n\
Bold flavour, zero compromise.\n\
Try it today.\n\
\n\
Variation 2:\n\
Your mornings just got an upgrade.\n\
\n\
Variation 3:\n\
Brewed for people who get things done.\n\
\n\
Let me know if you would like more options!";

    let parsed = parse_variations_detailed(output, 3);

    assert_eq!(parsed.strategy, ParseStrategy::NumberedLines);
    assert_eq!(parsed.padded, 0);
    assert_eq!(
        parsed.variations[0],
        "Bold flavour, zero compromise.\nTry it today."
    );
    assert_eq!(parsed.variations[1], "Your mornings just got an upgrade.");
    assert!(
        parsed.variations[2].starts_with("Brewed for people who get things done.")
    );
}

#[test]
fn unnumbered_paragraphs_fall_back() {
    let output = "Bold flavour, zero compromise.\n\nYour mornings just got an upgrade.";

    let parsed = parse_variations_detailed(output, 2);

    assert_eq!(parsed.strategy, ParseStrategy::Paragraphs);
    assert_eq!(
        parsed.variations,
        vec![
            "Bold flavour, zero compromise.",
            "Your mornings just got an upgrade."
        ]
    );
}

#[test]
fn empty_output_is_all_placeholders() {
    let variations = parse_variations("", 4);

    assert_eq!(variations, vec![FAILED_VARIATION_PLACEHOLDER; 4]);
}

#[test]
fn generated_ad_carries_parsed_variations() {
    let ad = GeneratedAd::from_generation(
        "brief-1",
        "email_subject",
        "1. Last chance for 20% off\n2. Your cart misses you",
        3,
    );

    assert_eq!(ad.variations.len(), 3);
    assert_eq!(ad.variations[0], "Last chance for 20% off");
    assert_eq!(ad.variations[2], FAILED_VARIATION_PLACEHOLDER);
}
