//! In-memory demo data: four seeded profiles plus a generator that keeps
//! producing numbered users.

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use swipedeck_core::{ItemId, ItemProvider, ProviderError, SwipeItem};
use tracing::debug;

const FIRST_GENERATED_ID: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoCard {
    pub id: i64,
    pub name: String,
    pub image_url: String,
}

impl SwipeItem for DemoCard {
    fn id(&self) -> ItemId {
        ItemId(self.id)
    }
}

fn portrait_url(gender: &str, n: i64) -> String {
    format!("https://randomuser.me/api/portraits/{gender}/{n}.jpg")
}

pub fn seed_cards() -> Vec<DemoCard> {
    [
        (1, "Alice", "women"),
        (2, "Bob", "men"),
        (3, "Clara", "women"),
        (4, "Dave", "men"),
    ]
    .into_iter()
    .map(|(id, name, gender)| DemoCard {
        id,
        name: name.to_string(),
        image_url: portrait_url(gender, id),
    })
    .collect()
}

/// Hands out `User N` cards starting at id 5. With a limit, reports
/// exhaustion after that many cards.
#[derive(Debug)]
pub struct DemoGenerator {
    next_id: AtomicI64,
    remaining: Option<AtomicU32>,
}

impl DemoGenerator {
    pub fn new(limit: Option<u32>) -> Self {
        Self {
            next_id: AtomicI64::new(FIRST_GENERATED_ID),
            remaining: limit.map(AtomicU32::new),
        }
    }

    fn take_budget(&self) -> bool {
        match &self.remaining {
            None => true,
            Some(remaining) => remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    n.checked_sub(1)
                })
                .is_ok(),
        }
    }

    pub fn next_card(&self) -> DemoCard {
        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        let gender = if id % 2 == 0 { "men" } else { "women" };
        DemoCard {
            id,
            name: format!("User {id}"),
            image_url: portrait_url(gender, id % 100),
        }
    }
}

#[async_trait]
impl ItemProvider<DemoCard> for DemoGenerator {
    async fn request_one(&self) -> Result<Option<DemoCard>, ProviderError> {
        if !self.take_budget() {
            debug!("demo generator exhausted");
            return Ok(None);
        }
        let card = self.next_card();
        debug!(id = card.id, name = %card.name, "generated demo card");
        Ok(Some(card))
    }
}
