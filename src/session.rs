//! One pass over the due queue: flip, rate, advance.
//!
//! The session is ephemeral. Its queue is fixed when it starts (oldest due
//! first) and never re-sorted; a card becoming due mid-session waits for the
//! next one. Only the schedule updates and the daily activity counter leave
//! the session; the stats die with it.

use crate::scheduler::Quality;
use crate::speech::Speech;
use crate::store::{Card, ScheduleStore};
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot rate a card before its answer is shown")]
    AnswerHidden,
    #[error("the session is already complete")]
    Complete,
}

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// question side of the current card is up
    Front,
    /// answer side is up; the card can be rated
    Back,
    Complete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub reviewed: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionStats {
    /// Per-cent accuracy, rounded to the nearest integer. 0 when nothing
    /// was reviewed.
    pub fn accuracy(&self) -> u32 {
        if self.reviewed == 0 {
            return 0;
        }
        (f64::from(self.correct) * 100.0 / f64::from(self.reviewed)).round() as u32
    }
}

/// What a finished session reports. `nothing_due` separates "the queue was
/// empty to begin with" from "reviewed the whole queue".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub nothing_due: bool,
    pub stats: SessionStats,
}

pub struct ReviewSession<S, V> {
    store: S,
    speech: V,
    queue: Vec<Card>,
    cursor: usize,
    flipped: bool,
    stats: SessionStats,
    nothing_due: bool,
}

impl<S: ScheduleStore, V: Speech> ReviewSession<S, V> {
    /// Fetch the due queue and enter the session. A failed fetch degrades to
    /// an empty queue, which completes immediately with nothing reviewed.
    pub async fn start<Tz: TimeZone>(store: S, speech: V, now: DateTime<Tz>) -> Self {
        let queue = match store.due_cards(now.with_timezone(&Utc)).await {
            Ok(queue) => queue,
            Err(err) => {
                warn!("failed to load due cards: {err:#}");
                Vec::new()
            }
        };
        let nothing_due = queue.is_empty();
        Self {
            store,
            speech,
            queue,
            cursor: 0,
            flipped: false,
            stats: SessionStats::default(),
            nothing_due,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.cursor >= self.queue.len() {
            Phase::Complete
        } else if self.flipped {
            Phase::Back
        } else {
            Phase::Front
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == Phase::Complete
    }

    pub fn current(&self) -> Option<&Card> {
        self.queue.get(self.cursor)
    }

    /// Cards not yet rated or skipped, the current one included.
    pub fn remaining(&self) -> usize {
        self.queue.len() - self.cursor
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            nothing_due: self.nothing_due,
            stats: self.stats,
        }
    }

    /// Reveal the answer side, reading it out if the card carries a back
    /// language. No-op unless the front is up.
    pub async fn flip(&mut self) {
        if self.phase() != Phase::Front {
            return;
        }
        self.flipped = true;
        self.speak_current(|card| (card.back.clone(), card.back_lang.clone()))
            .await;
    }

    /// Back to the question side. No-op unless the answer is up.
    pub async fn flip_back(&mut self) {
        if self.phase() != Phase::Back {
            return;
        }
        self.flipped = false;
        self.speak_current(|card| (card.front.clone(), card.front_lang.clone()))
            .await;
    }

    /// Rate the current card. Requires the answer side to be up: a rating
    /// for an unseen answer is a caller bug, not a default.
    ///
    /// The new schedule is persisted and the daily counter bumped before the
    /// cursor advances; failures of either are logged and the pass carries
    /// on.
    pub async fn rate<Tz: TimeZone>(
        &mut self,
        quality: Quality,
        now: DateTime<Tz>,
    ) -> Result<(), SessionError> {
        match self.phase() {
            Phase::Complete => return Err(SessionError::Complete),
            Phase::Front => return Err(SessionError::AnswerHidden),
            Phase::Back => {}
        }

        let day = now.date_naive();
        let (card_id, schedule) = {
            let card = &self.queue[self.cursor];
            (card.id, card.schedule.review(quality, now))
        };

        if let Err(err) = self.store.save_schedule(card_id, &schedule).await {
            warn!("failed to persist schedule for card {card_id}: {err:#}");
        }
        self.queue[self.cursor].schedule = schedule;

        if let Err(err) = self.store.record_review(day).await {
            warn!("failed to record review activity: {err:#}");
        }

        self.stats.reviewed += 1;
        if quality.is_recalled() {
            self.stats.correct += 1;
        } else {
            self.stats.incorrect += 1;
        }

        self.cursor += 1;
        self.flipped = false;
        Ok(())
    }

    /// Advance without rating; the card's schedule is untouched and the
    /// stats ignore it.
    pub fn skip(&mut self) {
        if self.is_complete() {
            return;
        }
        self.cursor += 1;
        self.flipped = false;
    }

    async fn speak_current(&mut self, side: impl Fn(&Card) -> (String, Option<String>)) {
        let Some(card) = self.queue.get(self.cursor) else {
            return;
        };
        let (text, lang) = side(card);
        let Some(lang) = lang else { return };
        if let Err(err) = self.speech.say(&text, &lang).await {
            debug!("speech unavailable: {err:#}");
        }
    }
}
