use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;
use std::fmt;

/// Error envelope returned by the listings service on 4xx/5xx.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub result: Option<ApiErrorResult>,
    pub status: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResult {
    pub message: Option<String>,
    pub messages: Option<HashMap<String, String>>,
}

impl ApiError {
    pub fn message(&self) -> Option<&str> {
        self.result
            .as_ref()?
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message().unwrap_or("unknown API error"))
    }
}

/// Complete body for `POST /api/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub picture: String,
}

/// Partial creation body. Unset fields are left out of the JSON entirely,
/// which is how incomplete payloads are sent to the service.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub seller_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub picture: Option<String>,
}

impl From<NewItem> for ItemDraft {
    fn from(item: NewItem) -> Self {
        Self {
            seller_id: Some(item.seller_id),
            title: Some(item.title),
            description: Some(item.description),
            price: Some(item.price),
            picture: Some(item.picture),
        }
    }
}

/// A listing as stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub picture: String,
    pub created_at: String,
}

/// `GET /api/items?sellerId=`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsPage {
    pub items: Vec<Item>,
}

/// `GET /api/items/{id}/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    pub item_id: String,
    pub views: i64,
    pub clicks: i64,
}
