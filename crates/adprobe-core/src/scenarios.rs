//! The black-box checks run against the listings service.
//!
//! Each scenario builds its own fixtures, talks to the service through
//! [`ListingsClient`] and returns the first expectation that did not hold.
//! Scenarios never share state except through the service itself.

use crate::client::{ApiResponse, ListingsClient};
use crate::error::{Error, Result};
use crate::fixtures::{
    NONEXISTENT_ITEM_ID, NONEXISTENT_SELLER_ID, SAMPLE_PICTURE, SAMPLE_PRICE, long_text,
    sample_item, timestamped_title, unique_seller_id,
};
use crate::models::{Item, ItemDraft, ItemStats, ItemsPage, NewItem};
use rand::Rng;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use strum::{Display, EnumIter, EnumMessage, EnumString, IntoEnumIterator, IntoStaticStr};

macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(Error::expectation(format!($($arg)+)));
        }
    };
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumMessage,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Scenario {
    #[strum(serialize = "TC-001", message = "Create valid listing")]
    CreateItem,
    #[strum(serialize = "TC-002", message = "Get listing by valid id")]
    GetItemById,
    #[strum(serialize = "TC-003", message = "List by sellerId (multiple listings)")]
    ItemsBySeller,
    #[strum(serialize = "TC-004", message = "Get stats for existing listing")]
    ItemStats,
    #[strum(serialize = "TC-005", message = "Create with missing required fields")]
    CreateMissingFields,
    #[strum(serialize = "TC-006", message = "Get by nonexistent id")]
    GetMissingItem,
    #[strum(serialize = "TC-007", message = "List by nonexistent sellerId")]
    ItemsByUnknownSeller,
    #[strum(serialize = "TC-008", message = "Get stats for nonexistent id")]
    MissingItemStats,
    #[strum(serialize = "TC-009", message = "Create with negative price")]
    CreateNegativePrice,
    #[strum(serialize = "TC-010", message = "Create with boundary values")]
    CreateBoundaryValues,
}

impl Scenario {
    pub fn all() -> Vec<Scenario> {
        Scenario::iter().collect()
    }

    pub fn id(self) -> &'static str {
        self.into()
    }

    pub fn title(self) -> &'static str {
        self.get_message().unwrap_or_default()
    }

    pub async fn run<R>(self, client: &ListingsClient, rng: &mut R) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        match self {
            Scenario::CreateItem => create_item(client, rng).await,
            Scenario::GetItemById => get_item_by_id(client, rng).await,
            Scenario::ItemsBySeller => items_by_seller(client, rng).await,
            Scenario::ItemStats => item_stats(client, rng).await,
            Scenario::CreateMissingFields => create_missing_fields(client).await,
            Scenario::GetMissingItem => get_missing_item(client).await,
            Scenario::ItemsByUnknownSeller => items_by_unknown_seller(client).await,
            Scenario::MissingItemStats => missing_item_stats(client).await,
            Scenario::CreateNegativePrice => create_negative_price(client, rng).await,
            Scenario::CreateBoundaryValues => create_boundary_values(client, rng).await,
        }
    }
}

async fn create_item<R: Rng + ?Sized>(client: &ListingsClient, rng: &mut R) -> Result<()> {
    let payload = sample_item(unique_seller_id(rng));
    let created = create(client, &payload).await?;

    ensure!(
        created.seller_id == payload.seller_id,
        "sellerId: expected {}, got {}",
        payload.seller_id,
        created.seller_id
    );
    ensure!(
        created.title == payload.title,
        "title: expected {:?}, got {:?}",
        payload.title,
        created.title
    );
    ensure!(
        created.description == payload.description,
        "description: expected {:?}, got {:?}",
        payload.description,
        created.description
    );
    ensure!(
        created.price == payload.price,
        "price: expected {}, got {}",
        payload.price,
        created.price
    );
    ensure!(
        created.picture == payload.picture,
        "picture: expected {:?}, got {:?}",
        payload.picture,
        created.picture
    );
    ensure!(!created.id.is_empty(), "created listing has an empty id");
    ensure!(
        !created.created_at.is_empty(),
        "created listing has an empty createdAt"
    );
    Ok(())
}

/// Decodes the fetched listing as a full [`Item`], so a response missing
/// `description`, `price`, `picture` or `createdAt` fails here even though
/// only `id`, `sellerId` and `title` are compared.
async fn get_item_by_id<R: Rng + ?Sized>(client: &ListingsClient, rng: &mut R) -> Result<()> {
    let payload = sample_item(unique_seller_id(rng));
    let created = create(client, &payload).await?;

    let fetched: Item = expect_ok(client.get_item(&created.id).await?)?;
    ensure!(
        fetched.id == created.id,
        "id: expected {:?}, got {:?}",
        created.id,
        fetched.id
    );
    ensure!(
        fetched.seller_id == payload.seller_id,
        "sellerId: expected {}, got {}",
        payload.seller_id,
        fetched.seller_id
    );
    ensure!(
        fetched.title == payload.title,
        "title: expected {:?}, got {:?}",
        payload.title,
        fetched.title
    );
    Ok(())
}

/// Every entry in `items` must decode as a full [`Item`]; only `sellerId`
/// and the count are compared.
async fn items_by_seller<R: Rng + ?Sized>(client: &ListingsClient, rng: &mut R) -> Result<()> {
    let seller_id = unique_seller_id(rng);
    let first = NewItem {
        seller_id,
        title: timestamped_title("First Item"),
        description: "First test item".to_string(),
        price: SAMPLE_PRICE,
        picture: "https://example.com/image1.jpg".to_string(),
    };
    let second = NewItem {
        title: timestamped_title("Second Item"),
        description: "Second test item".to_string(),
        ..first.clone()
    };
    create(client, &first).await?;
    create(client, &second).await?;

    let page: ItemsPage = expect_ok(client.items_by_seller(seller_id).await?)?;
    ensure!(
        page.items.len() >= 2,
        "expected at least 2 listings for seller {seller_id}, got {}",
        page.items.len()
    );
    if let Some(stray) = page.items.iter().find(|item| item.seller_id != seller_id) {
        return Err(Error::expectation(format!(
            "listing {} belongs to seller {}, queried {seller_id}",
            stray.id, stray.seller_id
        )));
    }
    Ok(())
}

async fn item_stats<R: Rng + ?Sized>(client: &ListingsClient, rng: &mut R) -> Result<()> {
    let created = create(client, &sample_item(unique_seller_id(rng))).await?;

    let stats: ItemStats = expect_ok(client.item_stats(&created.id).await?)?;
    ensure!(
        stats.item_id == created.id,
        "itemId: expected {:?}, got {:?}",
        created.id,
        stats.item_id
    );
    ensure!(stats.views >= 0, "views is negative: {}", stats.views);
    ensure!(stats.clicks >= 0, "clicks is negative: {}", stats.clicks);
    Ok(())
}

async fn create_missing_fields(client: &ListingsClient) -> Result<()> {
    let draft = ItemDraft {
        title: Some("Test Item".to_string()),
        ..ItemDraft::default()
    };
    let resp = client.create_item(&draft).await?;
    expect_status(
        &resp,
        &[StatusCode::BAD_REQUEST, StatusCode::UNPROCESSABLE_ENTITY],
    )
}

async fn get_missing_item(client: &ListingsClient) -> Result<()> {
    let resp = client.get_item(NONEXISTENT_ITEM_ID).await?;
    expect_status(&resp, &[StatusCode::NOT_FOUND])
}

async fn items_by_unknown_seller(client: &ListingsClient) -> Result<()> {
    let page: ItemsPage = expect_ok(client.items_by_seller(NONEXISTENT_SELLER_ID).await?)?;
    ensure!(
        page.items.is_empty(),
        "expected no listings for seller {NONEXISTENT_SELLER_ID}, got {}",
        page.items.len()
    );
    Ok(())
}

async fn missing_item_stats(client: &ListingsClient) -> Result<()> {
    let resp = client.item_stats(NONEXISTENT_ITEM_ID).await?;
    expect_status(&resp, &[StatusCode::NOT_FOUND])
}

async fn create_negative_price<R: Rng + ?Sized>(
    client: &ListingsClient,
    rng: &mut R,
) -> Result<()> {
    let payload = NewItem {
        seller_id: unique_seller_id(rng),
        title: "Test Item with Negative Price".to_string(),
        description: "Test description".to_string(),
        price: -100,
        picture: SAMPLE_PICTURE.to_string(),
    };
    let resp = client.create_item(&payload).await?;
    expect_status(
        &resp,
        &[StatusCode::BAD_REQUEST, StatusCode::UNPROCESSABLE_ENTITY],
    )
}

async fn create_boundary_values<R: Rng + ?Sized>(
    client: &ListingsClient,
    rng: &mut R,
) -> Result<()> {
    let payload = NewItem {
        seller_id: unique_seller_id(rng),
        title: long_text(1000),
        description: long_text(1000),
        price: 0,
        picture: SAMPLE_PICTURE.to_string(),
    };
    let resp = client.create_item(&payload).await?;
    // Either outcome is acceptable; only the status set is pinned.
    expect_status(&resp, &[StatusCode::OK, StatusCode::BAD_REQUEST])
}

async fn create(client: &ListingsClient, payload: &NewItem) -> Result<Item> {
    expect_ok(client.create_item(payload).await?)
}

fn expect_ok<T: DeserializeOwned>(resp: ApiResponse) -> Result<T> {
    expect_status(&resp, &[StatusCode::OK])?;
    resp.json()
}

/// Fails unless the status is one of `allowed`. For 4xx/5xx answers the
/// service's own message and request id are appended.
fn expect_status(resp: &ApiResponse, allowed: &[StatusCode]) -> Result<()> {
    let status = resp.status();
    if allowed.contains(&status) {
        return Ok(());
    }
    let expected = allowed
        .iter()
        .map(|s| s.as_u16().to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    tracing::debug!(body = resp.text(), "unexpected status");

    let mut message = format!("Expected {expected}, got {}", status.as_u16());
    if (status.is_client_error() || status.is_server_error())
        && let Some(api_error) = resp.api_error()
        && api_error.message().is_some()
    {
        message.push_str(&format!(": {api_error}"));
    }
    if let Some(request_id) = resp.request_id() {
        message.push_str(&format!(" (request id {request_id})"));
    }
    Err(Error::expectation(message))
}
