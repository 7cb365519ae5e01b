//! Payload and identifier helpers shared by the scenarios.

use crate::models::NewItem;
use chrono::Utc;
use rand::Rng;
use std::ops::RangeInclusive;

pub const SELLER_ID_RANGE: RangeInclusive<i64> = 111_111..=999_999;

/// Seller id assumed to own no listings on the shared service.
pub const NONEXISTENT_SELLER_ID: i64 = 123_456;

/// Item id that is never handed out by the service.
pub const NONEXISTENT_ITEM_ID: &str = "non_existent_id_12345";

pub const SAMPLE_DESCRIPTION: &str = "Test description for the item";
pub const SAMPLE_PICTURE: &str = "https://example.com/image.jpg";
pub const SAMPLE_PRICE: i64 = 1000;

/// Random seller id from [`SELLER_ID_RANGE`]. Collisions with other runs are
/// possible; [`NONEXISTENT_SELLER_ID`] is never returned.
pub fn unique_seller_id<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    loop {
        let id = rng.gen_range(SELLER_ID_RANGE);
        if id != NONEXISTENT_SELLER_ID {
            return id;
        }
    }
}

/// `"{prefix} {unix_seconds}"`
pub fn timestamped_title(prefix: &str) -> String {
    format!("{prefix} {}", Utc::now().timestamp())
}

pub fn sample_item(seller_id: i64) -> NewItem {
    NewItem {
        seller_id,
        title: timestamped_title("Test Item"),
        description: SAMPLE_DESCRIPTION.to_string(),
        price: SAMPLE_PRICE,
        picture: SAMPLE_PICTURE.to_string(),
    }
}

pub fn long_text(len: usize) -> String {
    "A".repeat(len)
}
