//! [`DocumentStore`] over the Notion REST API.
//!
//! | Operation          | Request                                   |
//! |--------------------|-------------------------------------------|
//! | `list_children`    | `GET    /blocks/{id}/children?page_size=` |
//! | `list_blocks`      | `GET    /blocks/{id}/children`            |
//! | `delete_block`     | `DELETE /blocks/{id}`                     |
//! | `append_children`  | `PATCH  /blocks/{id}/children`            |
//! | `create_page`      | `POST   /pages`                           |
//!
//! All calls are blocking.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use mdsync_core::{ContentBlock, PageId};

use crate::error::StoreError;
use crate::store::{DocumentStore, RemoteChild};

/// API version pinned in every request.
pub const NOTION_VERSION: &str = "2022-06-28";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking Notion client.
pub struct NotionClient {
    agent: ureq::Agent,
    base: String,
    token: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>, base: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            base: base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}{}", self.base, path))
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Notion-Version", NOTION_VERSION)
    }

    fn call(&self, request: ureq::Request, body: Option<Value>) -> Result<Value, StoreError> {
        let endpoint = format!("{} {}", request.method(), request.url());
        tracing::debug!("{endpoint}");
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        match result {
            Ok(response) => response
                .into_json::<Value>()
                .map_err(|e| decode_err(&endpoint, e.to_string())),
            Err(ureq::Error::Status(status, response)) => Err(api_error(status, response)),
            Err(ureq::Error::Transport(transport)) => Err(StoreError::Transport {
                endpoint,
                message: transport.to_string(),
            }),
        }
    }
}

impl DocumentStore for NotionClient {
    fn list_children(
        &self,
        container_id: &str,
        page_size: usize,
    ) -> Result<Vec<RemoteChild>, StoreError> {
        let path = format!("/blocks/{container_id}/children");
        let request = self
            .request("GET", &path)
            .query("page_size", &page_size.to_string());
        let response = self.call(request, None)?;
        parse_children(&response).ok_or_else(|| listing_err(&path))
    }

    fn list_blocks(&self, page_id: &str) -> Result<Vec<RemoteChild>, StoreError> {
        let path = format!("/blocks/{page_id}/children");
        let response = self.call(self.request("GET", &path), None)?;
        parse_children(&response).ok_or_else(|| listing_err(&path))
    }

    fn delete_block(&self, block_id: &str) -> Result<(), StoreError> {
        let request = self.request("DELETE", &format!("/blocks/{block_id}"));
        self.call(request, None).map(|_| ())
    }

    fn append_children(&self, page_id: &str, blocks: &[ContentBlock]) -> Result<(), StoreError> {
        let request = self.request("PATCH", &format!("/blocks/{page_id}/children"));
        self.call(request, Some(append_body(blocks))).map(|_| ())
    }

    fn create_page(
        &self,
        parent_id: &str,
        title: &str,
        blocks: &[ContentBlock],
    ) -> Result<PageId, StoreError> {
        let request = self.request("POST", "/pages");
        let response = self.call(request, Some(create_page_body(parent_id, title, blocks)))?;
        response
            .get("id")
            .and_then(Value::as_str)
            .map(PageId::from)
            .ok_or_else(|| decode_err("POST /pages", "response has no page id"))
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

pub(crate) fn append_body(blocks: &[ContentBlock]) -> Value {
    json!({ "children": blocks })
}

pub(crate) fn create_page_body(parent_id: &str, title: &str, blocks: &[ContentBlock]) -> Value {
    json!({
        "parent": { "page_id": parent_id },
        "properties": {
            "title": {
                "title": [{ "text": { "content": title } }]
            }
        },
        "children": blocks,
    })
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Extract children from a listing response.
///
/// Returns `None` when there is no `results` array. Entries without an `id`
/// or `type` are skipped.
pub(crate) fn parse_children(response: &Value) -> Option<Vec<RemoteChild>> {
    let results = response.get("results")?.as_array()?;
    Some(results.iter().filter_map(parse_child).collect())
}

fn parse_child(entry: &Value) -> Option<RemoteChild> {
    let id = entry.get("id")?.as_str()?;
    let kind = entry.get("type")?.as_str()?;
    let title = entry
        .get(kind)
        .and_then(|payload| payload.get("title"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(RemoteChild {
        id: PageId::from(id),
        kind: kind.to_string(),
        title,
    })
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn api_error(status: u16, response: ureq::Response) -> StoreError {
    let status_text = response.status_text().to_string();
    let body = response.into_json::<ApiErrorBody>().unwrap_or_default();
    StoreError::Api {
        status,
        code: if body.code.is_empty() {
            "unknown".to_string()
        } else {
            body.code
        },
        message: if body.message.is_empty() {
            status_text
        } else {
            body.message
        },
    }
}

fn listing_err(path: &str) -> StoreError {
    decode_err(&format!("GET {path}"), "missing results array")
}

fn decode_err(endpoint: &str, message: impl Into<String>) -> StoreError {
    StoreError::Decode {
        endpoint: endpoint.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_children_keeps_titles_and_skips_malformed() {
        let response = json!({
            "object": "list",
            "results": [
                { "id": "p1", "type": "child_page", "child_page": { "title": "Intro" } },
                { "id": "b1", "type": "paragraph", "paragraph": { "rich_text": [] } },
                { "type": "child_page", "child_page": { "title": "No id" } },
                { "id": 7, "type": "child_page" },
                "garbage",
            ],
            "has_more": false,
        });
        let children = parse_children(&response).expect("results");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id, PageId::from("p1"));
        assert_eq!(children[0].title.as_deref(), Some("Intro"));
        assert!(children[0].is_page());
        assert_eq!(children[1].kind, "paragraph");
        assert!(children[1].title.is_none());
    }

    #[test]
    fn parse_children_without_results_is_none() {
        assert!(parse_children(&json!({ "object": "error" })).is_none());
    }

    #[test]
    fn create_body_sets_parent_title_and_children() {
        let blocks = vec![ContentBlock::paragraph("hi")];
        let body = create_page_body("parent-1", "My Page", &blocks);
        assert_eq!(body["parent"]["page_id"], "parent-1");
        assert_eq!(
            body["properties"]["title"]["title"][0]["text"]["content"],
            "My Page"
        );
        assert_eq!(body["children"].as_array().unwrap().len(), 1);
        assert_eq!(body["children"][0]["type"], "paragraph");
    }

    #[test]
    fn append_body_wraps_children() {
        let body = append_body(&[ContentBlock::paragraph("a"), ContentBlock::paragraph("b")]);
        assert_eq!(body["children"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn listing_error_names_the_endpoint() {
        let err = listing_err("/blocks/page-1/children");
        assert_eq!(
            err,
            StoreError::Decode {
                endpoint: "GET /blocks/page-1/children".into(),
                message: "missing results array".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "unexpected response from GET /blocks/page-1/children: missing results array"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = NotionClient::new("token", "https://api.notion.com/v1/");
        assert_eq!(client.base, "https://api.notion.com/v1");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let client = NotionClient::new("token", "http://127.0.0.1:9");
        let err = client.list_children("parent", 10).unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }), "got: {err}");
    }
}
