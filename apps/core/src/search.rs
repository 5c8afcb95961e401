use crate::model::{chars_match_ignore_case, normalize_term, MatchRecord};
use crate::source::TextSource;

/// Character offsets of every case-insensitive occurrence of `term` in `text`.
///
/// Scanning resumes one character after each hit, so a term overlapping
/// itself is counted at every position ("aa" in "aaaa" hits 0, 1 and 2).
pub fn find_occurrences(text: &str, term: &str) -> Vec<usize> {
    let needle: Vec<char> = term.chars().collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let haystack: Vec<char> = text.chars().collect();
    if haystack.len() < needle.len() {
        return Vec::new();
    }

    let mut positions = Vec::new();
    let mut start = 0;
    while start + needle.len() <= haystack.len() {
        let window = &haystack[start..start + needle.len()];
        let hit = window
            .iter()
            .zip(&needle)
            .all(|(&hay, &pin)| chars_match_ignore_case(hay, pin));
        if hit {
            positions.push(start);
        }
        start += 1;
    }

    positions
}

pub fn count_occurrences(text: &str, term: &str) -> usize {
    find_occurrences(text, term).len()
}

/// Walks every searchable container and collects match records in document order.
pub fn scan<S: TextSource + ?Sized>(
    source: &S,
    term: &str,
    container_class: &str,
    excluded_tags: &[String],
) -> Vec<MatchRecord> {
    let term = normalize_term(term);
    if term.is_empty() {
        return Vec::new();
    }

    let term_len = term.chars().count();
    let mut records = Vec::new();

    for container in source.searchable_containers(container_class) {
        for (index, segment) in source.segments(container).iter().enumerate() {
            if segment.is_blank() || is_excluded(segment.tag, excluded_tags) {
                continue;
            }

            records.extend(find_occurrences(segment.text, term).into_iter().map(|start| {
                MatchRecord {
                    container,
                    element: segment.element,
                    segment: index,
                    start_offset: start,
                    end_offset: start + term_len,
                }
            }));
        }
    }

    records
}

fn is_excluded(tag: &str, excluded_tags: &[String]) -> bool {
    excluded_tags
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(tag))
}
