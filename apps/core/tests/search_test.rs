use chatfind_core::model::{ContainerId, ElementId, TextSegment};
use chatfind_core::search::{count_occurrences, find_occurrences, scan};
use chatfind_core::source::TextSource;

/// A text source with no DOM behind it: each container is a list of (tag, text) leaves.
struct Synthetic {
    containers: Vec<Vec<(&'static str, &'static str)>>,
}

impl Synthetic {
    fn element_for(container: usize, leaf: usize) -> ElementId {
        ElementId(container * 100 + leaf + 1)
    }
}

impl TextSource for Synthetic {
    fn searchable_containers(&self, _container_class: &str) -> Vec<ContainerId> {
        (0..self.containers.len())
            .map(|index| ContainerId(ElementId(index * 100)))
            .collect()
    }

    fn segments(&self, container: ContainerId) -> Vec<TextSegment<'_>> {
        let index = container.element().0 / 100;
        self.containers[index]
            .iter()
            .enumerate()
            .map(|(leaf, (tag, text))| TextSegment::new(Self::element_for(index, leaf), tag, text))
            .collect()
    }
}

fn excluded() -> Vec<String> {
    vec!["script".to_string(), "style".to_string()]
}

#[test]
fn overlapping_term_counts_every_start_position() {
    assert_eq!(count_occurrences("aaaa", "aa"), 3);
    assert_eq!(count_occurrences("abababa", "aba"), 3);
    assert_eq!(find_occurrences("Mississippi", "ISS"), vec![1, 4]);
}

#[test]
fn scan_preserves_container_then_leaf_order() {
    let source = Synthetic {
        containers: vec![
            vec![("p", "beta alpha"), ("b", "Alpha")],
            vec![("p", "nothing"), ("i", "ALPHA alpha")],
        ],
    };

    let records = scan(&source, "alpha", "message-content", &excluded());
    let positions: Vec<(usize, usize, usize)> = records
        .iter()
        .map(|record| (record.container.element().0, record.segment, record.start_offset))
        .collect();

    assert_eq!(
        positions,
        vec![(0, 0, 5), (0, 1, 0), (100, 1, 0), (100, 1, 6)]
    );
    assert!(records.iter().all(|record| record.end_offset - record.start_offset == 5));
    assert_eq!(records[3].element, Synthetic::element_for(1, 1));
}

#[test]
fn scan_offsets_stay_inside_segment_text() {
    let source = Synthetic {
        containers: vec![vec![("p", "straße STRASSE Straße")]],
    };

    let records = scan(&source, "straße", "message-content", &excluded());
    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(record.start_offset < record.end_offset);
        assert!(record.end_offset <= "straße STRASSE Straße".chars().count());
        assert_eq!(
            record.excerpt("straße STRASSE Straße").map(str::to_lowercase),
            Some("straße".to_string())
        );
    }
}

#[test]
fn scan_skips_excluded_and_blank_leaves() {
    let source = Synthetic {
        containers: vec![vec![
            ("script", "let needle = 1"),
            ("Style", ".needle{}"),
            ("p", "   "),
            ("p", "needle"),
        ]],
    };

    let records = scan(&source, "needle", "message-content", &excluded());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].segment, 3);
}

#[test]
fn blank_term_scans_nothing() {
    let source = Synthetic {
        containers: vec![vec![("p", "anything")]],
    };
    assert!(scan(&source, "  ", "message-content", &excluded()).is_empty());
}
