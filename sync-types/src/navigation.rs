//! Router interface types.
//!
//! The engine never touches the address bar directly. It describes the
//! change it wants as a [`NavigationRequest`] and learns about completed
//! navigations through [`NavigationEnd`] notifications.

use std::collections::BTreeMap;

use crate::value::QueryParams;

/// How the requested query interacts with the parameters already in the URL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryParamsHandling {
    /// Keep existing keys that the request does not mention.
    #[default]
    Merge,
    /// Drop every existing key and use only the request's keys.
    Replace,
}

/// A request to change the URL's query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Keys to set (`Some`) or remove (`None`).
    pub query: BTreeMap<String, Option<String>>,
    /// Interaction with existing parameters.
    pub handling: QueryParamsHandling,
    /// Replace the current history entry instead of pushing a new one.
    pub replace_url: bool,
}

impl NavigationRequest {
    /// A merge request that replaces the current history entry.
    pub fn merge_replace(query: BTreeMap<String, Option<String>>) -> Self {
        Self {
            query,
            handling: QueryParamsHandling::Merge,
            replace_url: true,
        }
    }

    /// Apply this request to an existing parameter map.
    pub fn apply_to(&self, current: &QueryParams) -> QueryParams {
        let mut next = match self.handling {
            QueryParamsHandling::Merge => current.clone(),
            QueryParamsHandling::Replace => QueryParams::new(),
        };
        for (key, value) in &self.query {
            match value {
                Some(value) => {
                    next.insert(key.clone(), value.clone());
                }
                None => {
                    next.remove(key);
                }
            }
        }
        next
    }
}

/// Notification that a navigation has completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationEnd {
    /// Sequence number assigned by the router.
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn merge_keeps_unmentioned_keys() {
        let current = params(&[("page", "2"), ("title", "old")]);
        let mut query = BTreeMap::new();
        query.insert("title".to_string(), Some("new".to_string()));

        let next = NavigationRequest::merge_replace(query).apply_to(&current);
        assert_eq!(next, params(&[("page", "2"), ("title", "new")]));
    }

    #[test]
    fn merge_removes_none_keys() {
        let current = params(&[("page", "2"), ("title", "old")]);
        let mut query = BTreeMap::new();
        query.insert("title".to_string(), None);

        let next = NavigationRequest::merge_replace(query).apply_to(&current);
        assert_eq!(next, params(&[("page", "2")]));
    }

    #[test]
    fn replace_drops_existing_keys() {
        let current = params(&[("page", "2")]);
        let mut query = BTreeMap::new();
        query.insert("title".to_string(), Some("x".to_string()));

        let request = NavigationRequest {
            query,
            handling: QueryParamsHandling::Replace,
            replace_url: false,
        };
        assert_eq!(request.apply_to(&current), params(&[("title", "x")]));
    }
}
