//! Types shared by every SCP product line.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A page of list results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub contents: Vec<T>,
    /// Total number of hits across all pages.
    #[serde(default)]
    pub total_count: i64,
}

/// Answer of an asynchronous provisioning request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncResponse {
    /// Identifier of the affected resource, when the API knows it yet.
    #[serde(default)]
    pub resource_id: String,
    /// Identifier of the queued request.
    #[serde(default)]
    pub request_id: String,
}

/// A tag attached at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    /// Tag key.
    pub tag_key: String,
    /// Tag value.
    pub tag_value: String,
}

/// Paging and sorting options for list calls.
///
/// Also deserialized, flattened, from datasource blocks that expose
/// `page`, `size` and `sort`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Zero-based page number.
    pub page: Option<i64>,
    /// Page size.
    pub size: Option<i64>,
    /// Sort expressions such as `createdDt:desc`.
    pub sort: Vec<String>,
}

impl PageRequest {
    /// Creates a request for a single page.
    #[must_use]
    pub const fn new(page: i64, size: i64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            sort: Vec::new(),
        }
    }

    /// Adds a sort expression.
    #[must_use]
    pub fn sorted_by(mut self, sort: impl Into<String>) -> Self {
        self.sort.push(sort.into());
        self
    }

    /// Appends the paging parameters to a query.
    pub(crate) fn append_to(&self, query: &mut Vec<(&'static str, String)>) {
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size", size.to_string()));
        }
        for sort in &self.sort {
            query.push(("sort", sort.clone()));
        }
    }
}

/// Converts a tag map into the request list form, ordered by key.
#[must_use]
pub fn tag_requests(tags: &BTreeMap<String, String>) -> Vec<TagRequest> {
    tags.iter()
        .map(|(k, v)| TagRequest {
            tag_key: k.clone(),
            tag_value: v.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_requests_are_sorted() {
        let mut tags = BTreeMap::new();
        tags.insert(String::from("team"), String::from("infra"));
        tags.insert(String::from("env"), String::from("prod"));

        let list = tag_requests(&tags);
        assert_eq!(list[0].tag_key, "env");
        assert_eq!(list[1].tag_value, "infra");
    }

    #[test]
    fn test_page_request_query() {
        let mut query = Vec::new();
        PageRequest::new(0, 1000)
            .sorted_by("createdDt:desc")
            .append_to(&mut query);

        assert_eq!(
            query,
            vec![
                ("page", String::from("0")),
                ("size", String::from("1000")),
                ("sort", String::from("createdDt:desc")),
            ]
        );
    }

    #[test]
    fn test_list_response_defaults() {
        let list: ListResponse<serde_json::Value> = serde_json::from_str("{}").expect("parse");
        assert!(list.contents.is_empty());
        assert_eq!(list.total_count, 0);
    }
}
