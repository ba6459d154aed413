use crate::form::label::UNKNOWN_FIELD;

/// How well a candidate label matched a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    /// One label contains the other.
    Contains,
    Exact,
}

/// Compare two labels. Exact equality beats containment in either direction.
///
/// Empty labels and the unknown-field sentinel only ever match exactly, so
/// an unlabeled control is never picked up by containment.
pub fn match_labels(candidate: &str, target: &str) -> Option<MatchQuality> {
    if candidate == target {
        return if candidate.is_empty() {
            None
        } else {
            Some(MatchQuality::Exact)
        };
    }
    if candidate.is_empty() || target.is_empty() {
        return None;
    }
    if candidate == UNKNOWN_FIELD || target == UNKNOWN_FIELD {
        return None;
    }
    if candidate.contains(target) || target.contains(candidate) {
        Some(MatchQuality::Contains)
    } else {
        None
    }
}

/// Bidirectional substring match.
pub fn labels_match(candidate: &str, target: &str) -> bool {
    match_labels(candidate, target).is_some()
}

/// Pick the best candidate: highest quality, earliest in iteration
/// (document) order among equals.
pub fn best_match<T, I>(candidates: I) -> Option<T>
where
    I: IntoIterator<Item = (T, MatchQuality)>,
{
    let mut best: Option<(T, MatchQuality)> = None;
    for (item, quality) in candidates {
        let better = match &best {
            Some((_, q)) => quality > *q,
            None => true,
        };
        if better {
            best = Some((item, quality));
        }
    }
    best.map(|(item, _)| item)
}
