//! Persistence seam for card schedules and review activity.

use crate::scheduler::CardSchedule;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

pub mod sqlite_store;

/// A flashcard together with its scheduling state.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: i64,
    pub front: String,
    pub back: String,
    pub note: Option<String>,
    /// language tags for text-to-speech, e.g. "en-us"
    pub front_lang: Option<String>,
    pub back_lang: Option<String>,
    pub schedule: CardSchedule,
}

#[allow(async_fn_in_trait)]
pub trait ScheduleStore {
    /// All cards due at `now`, oldest due first.
    async fn due_cards(&self, now: DateTime<Utc>) -> Result<Vec<Card>>;

    /// Persist one card's new schedule. Applied atomically per card.
    async fn save_schedule(&self, card_id: i64, schedule: &CardSchedule) -> Result<()>;

    /// Bump the review counter for `day` by one, creating the row if absent.
    async fn record_review(&self, day: NaiveDate) -> Result<()>;
}
