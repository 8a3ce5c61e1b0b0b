// ── List query and response shapes ──
//
// The list endpoints page by absolute item index: `rangeStart` and
// `rangeEnd` are zero-based and inclusive.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One windowed list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub range_start: usize,
    pub range_end: usize,
    /// Filter and sort fields, already projected to wire form.
    pub params: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(range_start: usize, range_end: usize) -> Self {
        Self {
            range_start,
            range_end,
            params: BTreeMap::new(),
        }
    }

    /// Merge filter/sort params into this query. Range keys always win.
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    /// Number of items the window spans.
    pub fn len(&self) -> usize {
        self.range_end.saturating_add(1).saturating_sub(self.range_start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into `(key, value)` pairs for the query string.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(k, _)| k.as_str() != "rangeStart" && k.as_str() != "rangeEnd")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.push(("rangeStart".into(), self.range_start.to_string()));
        pairs.push(("rangeEnd".into(), self.range_end.to_string()));
        pairs
    }
}

/// Body returned by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub results: Vec<T>,
    /// Authoritative count for the current filter set.
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_length_is_inclusive() {
        assert_eq!(ListQuery::new(0, 9).len(), 10);
        assert_eq!(ListQuery::new(20, 29).len(), 10);
    }

    #[test]
    fn window_ending_at_usize_max_does_not_overflow() {
        assert_eq!(ListQuery::new(0, usize::MAX).len(), usize::MAX);
        assert!(ListQuery::new(5, 3).is_empty());
    }

    #[test]
    fn range_params_cannot_be_overridden() {
        let mut params = BTreeMap::new();
        params.insert("rangeStart".to_string(), "99".to_string());
        params.insert("name".to_string(), "Grace".to_string());

        let pairs = ListQuery::new(10, 19).with_params(params).to_pairs();

        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "Grace".to_string()),
                ("rangeStart".to_string(), "10".to_string()),
                ("rangeEnd".to_string(), "19".to_string()),
            ]
        );
    }
}
