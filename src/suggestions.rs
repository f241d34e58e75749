//! # Error Suggestions
//!
//! Helpers for building error messages that say what went wrong AND how to
//! fix it. The library attaches hints to its typed errors through
//! [`name_hint`]; the CLI uses the `anyhow` constructors for failures that
//! happen before the engine runs.

use std::path::Path;

/// Generate an error for when the manifest file is not found.
///
/// Includes hints about:
/// - Creating a new manifest
/// - Using the -y/--yaml flag
/// - Using the QUACK_MANIFEST environment variable
pub fn manifest_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Manifest not found: {path}\n\n\
         hint: Create a quack.yaml file with 'modules' and 'profiles' sections\n\
         hint: Use -y/--yaml to specify a different manifest\n\
         hint: Set QUACK_MANIFEST environment variable",
        path = path.display()
    )
}

/// Generate an error for a working root that does not exist.
pub fn root_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Working root does not exist: {path}\n\n\
         hint: Use -C/--root with an existing directory",
        path = path.display()
    )
}

/// Build the hint attached to an unknown profile or module name.
///
/// Suggests the closest declared name when one is within a small edit
/// distance, and always lists what is available.
pub fn name_hint(kind: &str, input: &str, candidates: &[&str]) -> Option<String> {
    if candidates.is_empty() {
        return Some(format!("The manifest declares no {kind}s"));
    }
    let available = format!("Available {kind}s: {}", candidates.join(", "));
    match find_similar(input, candidates) {
        Some(similar) => Some(format!("Did you mean '{similar}'? {available}")),
        None => Some(available),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row: previous[j] is the distance between a[..i] and b[..j].
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}
