// Variation parsing
// Splits a block of generated ad copy into the requested number of variations


use tracing::{debug, warn};

/// Filler used when the model output does not contain enough variations
pub const FAILED_VARIATION_PLACEHOLDER: &str = "Content generation failed. Please try again.";

pub const DEFAULT_VARIATION_COUNT: usize = 3;
pub const MAX_AD_VARIATIONS: usize = 5;

/// Which pass produced the final set of variations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Sequential scan for `1.`, `Variation 1:` and similar headers
    NumberedLines,
    /// Direct search for each expected marker, slicing between them
    ForcedMarkers,
    /// Blank-line separated paragraphs, markers ignored
    Paragraphs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVariations {
    pub variations: Vec<String>,
    pub strategy: ParseStrategy,
    /// Number of slots filled with [`FAILED_VARIATION_PLACEHOLDER`]
    pub padded: usize,
}

impl ParsedVariations {
    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.padded > 0
    }
}

/// Parse exactly `expected_count` variations out of `content`.
///
/// Never fails and never returns an empty string. When the text cannot be
/// segmented into enough non-blank pieces the result is padded with
/// [`FAILED_VARIATION_PLACEHOLDER`]; when it contains more, only the first
/// `expected_count` are kept.
///
/// A header line such as `1. Buy now` starts its variation with the text after
/// the header. If the line contains a colon, only the text after the first
/// colon is kept, so `Variation 1: Buy now` and `1. Headline: Buy now` both
/// yield `Buy now`.
#[inline]
pub fn parse_variations(content: &str, expected_count: usize) -> Vec<String> {
    parse_variations_detailed(content, expected_count).variations
}

/// Same as [`parse_variations`], but also reports how the result was obtained
#[inline]
pub fn parse_variations_detailed(content: &str, expected_count: usize) -> ParsedVariations {
    let lines: Vec<&str> = content.split('\n').collect();

    let mut strategy = ParseStrategy::NumberedLines;
    let mut variations = scan_numbered_lines(&lines);

    if variations.len() < expected_count {
        debug!(
            found = variations.len(),
            expected = expected_count,
            "Line scan found too few variations, searching for markers"
        );
        strategy = ParseStrategy::ForcedMarkers;
        variations = split_at_markers(&lines, expected_count);
    }

    if variations.len() < expected_count {
        debug!(
            found = variations.len(),
            expected = expected_count,
            "Marker search found too few variations, splitting paragraphs"
        );
        strategy = ParseStrategy::Paragraphs;
        variations = split_paragraphs(content);
    }

    let mut variations: Vec<String> = variations
        .into_iter()
        .map(|variation| variation.trim().to_string())
        .filter(|variation| !variation.is_empty())
        .take(expected_count)
        .collect();

    let padded = expected_count - variations.len();
    if padded > 0 {
        warn!(
            expected = expected_count,
            parsed = variations.len(),
            padded,
            "Variation parsing degraded, padding with placeholders"
        );
        variations.resize(expected_count, FAILED_VARIATION_PLACEHOLDER.to_string());
    }

    ParsedVariations {
        variations,
        strategy,
        padded,
    }
}

/// Markers accepted at the start of a section, in matching priority order
fn section_markers(number: usize) -> [String; 4] {
    [
        format!("{number}."),
        format!("Variation {number}:"),
        format!("Variation {number}."),
        format!("Variation {number}"),
    ]
}

/// Returns the text following the header if `trimmed` opens variation `number`
fn header_remainder(trimmed: &str, number: usize) -> Option<&str> {
    let [dotted, labeled_colon, labeled_dot, labeled] = section_markers(number);

    if trimmed == labeled || trimmed == number.to_string() {
        return Some("");
    }

    [dotted, labeled_colon, labeled_dot]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker.as_str()))
}

fn scan_numbered_lines(lines: &[&str]) -> Vec<String> {
    let mut variations = Vec::new();
    let mut current = String::new();
    let mut number = 1;

    for line in lines {
        let trimmed = line.trim();

        if let Some(remainder) = header_remainder(trimmed, number) {
            // Anything before the first header is preamble and gets dropped
            if !current.is_empty() && number > 1 {
                variations.push(current.trim().to_string());
            }

            current = match line.split_once(':') {
                Some((_, rest)) => rest.trim().to_string(),
                None => remainder.trim().to_string(),
            };
            number += 1;
        } else if !current.is_empty() || !trimmed.is_empty() {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        variations.push(current.trim().to_string());
    }

    variations
}

fn split_at_markers(lines: &[&str], expected_count: usize) -> Vec<String> {
    let mut variations = Vec::with_capacity(expected_count);

    for number in 1..=expected_count {
        let markers = section_markers(number);

        let Some(start) = markers.iter().find_map(|marker| {
            lines
                .iter()
                .position(|line| line.trim().starts_with(marker.as_str()))
        }) else {
            continue;
        };

        let end = if number < expected_count {
            let next_markers = section_markers(number + 1);
            lines
                .iter()
                .enumerate()
                .skip(start + 1)
                .find(|(_, line)| {
                    let trimmed = line.trim();
                    next_markers
                        .iter()
                        .any(|marker| trimmed.starts_with(marker.as_str()))
                })
                .map_or(lines.len(), |(idx, _)| idx)
        } else {
            lines.len()
        };

        let section = lines[start..end].join("\n");
        let section = section.trim();
        let body = markers
            .iter()
            .find_map(|marker| section.strip_prefix(marker.as_str()))
            .unwrap_or(section);

        let body = body.trim();
        if !body.is_empty() {
            variations.push(body.to_string());
        }
    }

    variations
}

fn split_paragraphs(content: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}
