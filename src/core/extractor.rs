//! Pulls tracking-number candidates out of free-form text (SMS, chat
//! messages, pasted notifications).

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::carriers::{self, Carrier};
use crate::domain::model::Candidate;

/// How far back (in characters) a carrier keyword may sit before a digit
/// run and still count as naming its carrier.
const KEYWORD_WINDOW_CHARS: usize = 40;

const MIN_DIGITS: usize = 10;
const MAX_DIGITS: usize = 15;

struct Patterns {
    /// Explicit mentions: 운송장/송장/invoice/tracking followed by digits.
    explicit: Regex,
    /// Standalone 10-14 digit runs.
    standalone: Regex,
    /// Dash- or space-grouped digits, e.g. 6401-2345-6789.
    dashed: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        explicit: Regex::new(
            r"(?i)(?:운송장|송장|invoice|tracking)\s*(?:번호)?[:\s]*([0-9][0-9\-\s]{8,18}[0-9])",
        )
        .unwrap(),
        standalone: Regex::new(r"\b[0-9]{10,14}\b").unwrap(),
        dashed: Regex::new(r"\b[0-9]{3,5}[\-\s][0-9]{3,5}[\-\s][0-9]{3,5}\b").unwrap(),
    })
}

/// Strip the separators carriers and humans sprinkle into numbers.
pub fn normalize_tracking_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '.' | '\t'))
        .collect()
}

/// Loose format check: Korean carriers use 10-14 digit numbers.
pub fn validate_tracking_number(tracking_number: &str) -> bool {
    !tracking_number.is_empty()
        && tracking_number.chars().all(|c| c.is_ascii_digit())
        && (10..=14).contains(&tracking_number.len())
}

/// A digit run found in the text, with its byte offset for keyword
/// proximity checks.
struct DigitRun {
    start: usize,
    raw: String,
    digits: String,
}

fn collect_runs(text: &str) -> Vec<DigitRun> {
    let p = patterns();
    let mut runs: Vec<DigitRun> = Vec::new();

    let mut push = |start: usize, raw: &str| {
        let digits = normalize_tracking_number(raw);
        if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
            return;
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return;
        }
        if runs.iter().any(|r| r.digits == digits && r.start == start) {
            return;
        }
        runs.push(DigitRun {
            start,
            raw: raw.to_string(),
            digits,
        });
    };

    for caps in p.explicit.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            push(m.start(), m.as_str());
        }
    }
    for m in p.standalone.find_iter(text) {
        push(m.start(), m.as_str());
    }
    for m in p.dashed.find_iter(text) {
        push(m.start(), m.as_str());
    }

    runs.sort_by_key(|r| r.start);
    runs
}

/// Carrier named within the keyword window before `start`, if any.
fn carrier_keyword_before(text: &str, start: usize) -> Option<&'static Carrier> {
    let prefix = &text[..start];
    let window_start = prefix
        .char_indices()
        .rev()
        .take(KEYWORD_WINDOW_CHARS)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0);
    let window = prefix[window_start..].to_lowercase().replace(' ', "");

    carriers::CARRIERS
        .iter()
        .find(|c| c.aliases.iter().any(|alias| window.contains(alias)))
}

/// Scan text for tracking-number candidates, in order of appearance.
///
/// A carrier keyword near a digit run pins the guess to that carrier.
/// Otherwise every carrier whose number pattern matches the run yields its
/// own candidate; with no pattern match either, the candidate carries no
/// guess and the client will attempt multi-carrier lookup. Duplicate digit
/// runs are not merged; the caller decides.
///
/// No matches is an empty vec, not an error.
pub fn extract(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for run in collect_runs(text) {
        if let Some(carrier) = carrier_keyword_before(text, run.start) {
            candidates.push(Candidate {
                raw_text: run.raw.clone(),
                courier: Some(carrier),
                tracking_number: run.digits.clone(),
            });
            continue;
        }

        let matches = carriers::matching_patterns(&run.digits);
        if matches.is_empty() {
            candidates.push(Candidate {
                raw_text: run.raw.clone(),
                courier: None,
                tracking_number: run.digits.clone(),
            });
        } else {
            for carrier in matches {
                candidates.push(Candidate {
                    raw_text: run.raw.clone(),
                    courier: Some(carrier),
                    tracking_number: run.digits.clone(),
                });
            }
        }
    }

    tracing::debug!(count = candidates.len(), "extracted tracking candidates");
    candidates
}
