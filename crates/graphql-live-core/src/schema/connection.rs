//! Relay connections assembled from edge fields.

use serde::Serialize;
use serde_json::Value;

use crate::errors::LiveResult;
use crate::schema::edges::{EdgeField, EdgeValue};
use crate::schema::global_id::decode_typed;
use crate::schema::guards::clamp_page_size;

/// `first` / `after` pagination arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    pub first: Option<i64>,
    pub after: Option<String>,
}

impl ConnectionArgs {
    pub fn first(first: i64) -> Self {
        Self {
            first: Some(first),
            after: None,
        }
    }

    pub fn after(mut self, cursor: &str) -> Self {
        self.after = Some(cursor.to_string());
        self
    }

    /// Read `first` and `after` from a GraphQL argument object.
    pub fn from_args(args: &serde_json::Map<String, Value>) -> Self {
        Self {
            first: args.get("first").and_then(Value::as_i64),
            after: args
                .get("after")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub edges: Vec<EdgeValue>,
    pub page_info: PageInfo,
}

impl Connection {
    /// Page through `payloads` in order.
    ///
    /// `after` must be a cursor of the field's cursor type; the page starts
    /// right after the payload whose raw cursor it carries. A well-formed
    /// cursor that matches no payload yields an empty page. Page sizes come
    /// from the field as well.
    pub fn from_payloads(
        field: &EdgeField,
        payloads: &[Value],
        args: &ConnectionArgs,
    ) -> LiveResult<Self> {
        let start = match &args.after {
            Some(cursor) => {
                let raw = decode_typed(cursor, field.cursor_type())?;
                payloads
                    .iter()
                    .position(|payload| field.raw_cursor(payload) == raw)
                    .map(|idx| idx + 1)
                    .unwrap_or(payloads.len())
            }
            None => 0,
        };

        let size = clamp_page_size(args.first, field.default_page_size(), field.max_page_size());
        let end = start.saturating_add(size as usize).min(payloads.len());

        let edges: Vec<EdgeValue> = payloads[start..end]
            .iter()
            .map(|payload| field.resolve(payload))
            .collect();

        let page_info = PageInfo {
            has_next_page: end < payloads.len(),
            has_previous_page: start > 0,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        };

        Ok(Self { edges, page_info })
    }

    pub fn to_json(&self) -> LiveResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
