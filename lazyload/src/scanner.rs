//! Visibility scanner.
//!
//! Partitions a session's candidates into those now visible inside the
//! container and those still pending. The container box is read once per
//! scan; every candidate box is read fresh.

use tracing::warn;

use crate::geometry::{compute_box, intersects};
use crate::host::Host;
use crate::queue::QueueItem;

/// Result of one scan.
#[derive(Debug)]
pub struct ScanOutcome<E> {
    /// Newly visible candidates, in candidate order.
    pub visible: Vec<QueueItem<E>>,

    /// Candidates that are still off-screen, in candidate order.
    pub pending: Vec<E>,

    /// Visible candidates dropped because they carry no source attribute.
    pub skipped: usize,
}

/// Scans `candidates` against `container`.
///
/// `attribute` names the attribute holding each candidate's real URL. The
/// input slice is left untouched.
pub fn scan<H: Host>(
    host: &H,
    container: &H::Element,
    candidates: &[H::Element],
    attribute: &str,
) -> ScanOutcome<H::Element> {
    let container_box = compute_box(host, container);

    let mut outcome = ScanOutcome {
        visible: Vec::new(),
        pending: Vec::new(),
        skipped: 0,
    };

    for candidate in candidates {
        let candidate_box = compute_box(host, candidate);
        if !intersects(&container_box, &candidate_box) {
            outcome.pending.push(candidate.clone());
            continue;
        }

        match host.get_attribute(candidate, attribute) {
            Some(src) => outcome.visible.push(QueueItem::new(candidate.clone(), src)),
            None => {
                warn!(element = ?candidate, attribute, "Visible candidate has no source attribute");
                outcome.skipped += 1;
            }
        }
    }

    outcome
}
