//! Completion candidates and the frontier that collects them.

use serde::Serialize;

/// One suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Text to insert.
    pub value: String,
    /// Display title, when it differs from the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A placeholder (`<amount>`) describing what to type rather than text
    /// to insert.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hint: bool,
}

impl Candidate {
    /// A candidate that inserts `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            title: None,
            description: None,
            hint: false,
        }
    }

    /// A placeholder describing the expected input.
    pub fn hint(text: impl Into<String>) -> Self {
        Self {
            hint: true,
            ..Self::new(text)
        }
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether `value` starts with `partial`, ignoring ASCII case.
    pub fn starts_with(&self, partial: &str) -> bool {
        starts_with_ignore_case(&self.value, partial)
    }
}

/// Suggestions contributed by one parser at the completion frontier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateGroup {
    /// Usage fragment of the contributing argument (`<amount>`, `-a|-all <int>`).
    pub title: String,
    /// Description of the contributing argument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The partially typed word being completed.
    pub partial: String,
    /// Every candidate the parser offered.
    pub candidates: Vec<Candidate>,
}

impl CandidateGroup {
    /// Candidates whose value starts with the partial word. Hints always match.
    pub fn matching(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .filter(|c| c.hint || c.starts_with(&self.partial))
    }
}

/// Result of a completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Completions {
    /// Weight of the frontier the groups were collected at.
    pub weight: Option<u32>,
    /// Groups in discovery order.
    pub groups: Vec<CandidateGroup>,
}

impl Completions {
    /// Whether no group was collected.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Insertable values of every matching candidate, without duplicates,
    /// in discovery order.
    pub fn suggestions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for candidate in self.groups.iter().flat_map(CandidateGroup::matching) {
            if !candidate.hint && !out.contains(&candidate.value) {
                out.push(candidate.value.clone());
            }
        }
        out
    }
}

/// Collects candidate groups across completion branches. Only groups found
/// at the greatest weight survive.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    weight: Option<u32>,
    groups: Vec<CandidateGroup>,
}

impl Frontier {
    pub(crate) fn offer(&mut self, weight: u32, groups: impl IntoIterator<Item = CandidateGroup>) {
        match self.weight {
            Some(current) if weight < current => return,
            Some(current) if weight == current => {}
            _ => {
                tracing::trace!(weight, "completion frontier advanced");
                self.weight = Some(weight);
                self.groups.clear();
            }
        }
        for group in groups {
            if !self.groups.contains(&group) {
                self.groups.push(group);
            }
        }
    }

    pub(crate) fn into_completions(self) -> Completions {
        Completions {
            weight: self.weight,
            groups: self.groups,
        }
    }
}

pub(crate) fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(partial: &str, values: &[&str]) -> CandidateGroup {
        CandidateGroup {
            title: "t".into(),
            description: None,
            partial: partial.into(),
            candidates: values.iter().map(|v| Candidate::new(*v)).collect(),
        }
    }

    #[test]
    fn matching_is_case_insensitive_prefix() {
        let mut g = group("Gi", &["give", "GIFT", "take"]);
        g.candidates.push(Candidate::hint("<player>"));
        let values: Vec<&str> = g.matching().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["give", "GIFT", "<player>"]);
    }

    #[test]
    fn prefix_on_char_boundary_only() {
        assert!(!starts_with_ignore_case("é", "\u{65}"));
        assert!(starts_with_ignore_case("éa", "é"));
    }

    #[test]
    fn frontier_keeps_heaviest() {
        let mut f = Frontier::default();
        f.offer(1, [group("", &["a"])]);
        f.offer(1, [group("", &["b"])]);
        f.offer(0, [group("", &["c"])]);
        assert_eq!(f.weight, Some(1));
        assert_eq!(f.groups.len(), 2);
        f.offer(2, [group("", &["d"])]);
        let done = f.into_completions();
        assert_eq!(done.weight, Some(2));
        assert_eq!(done.suggestions(), ["d"]);
    }

    #[test]
    fn frontier_drops_identical_groups() {
        let mut f = Frontier::default();
        f.offer(0, [group("", &["a"])]);
        f.offer(0, [group("", &["a"])]);
        assert_eq!(f.into_completions().groups.len(), 1);
    }

    #[test]
    fn suggestions_skip_hints_and_duplicates() {
        let mut a = group("", &["x", "y"]);
        a.candidates.push(Candidate::hint("<n>"));
        let b = group("", &["y", "z"]);
        let c = Completions {
            weight: Some(0),
            groups: vec![a, b],
        };
        assert_eq!(c.suggestions(), ["x", "y", "z"]);
    }
}
