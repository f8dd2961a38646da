//! Card store backed by SQLite.

use crate::db_path;
use crate::scheduler::CardSchedule;
use crate::store::{Card, ScheduleStore};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteStore {
    pub conn: SqlitePool,
}

impl ScheduleStore for SqliteStore {
    async fn due_cards(&self, now: DateTime<Utc>) -> Result<Vec<Card>> {
        let rows = sqlx::query(
            "SELECT id, front, back, note, front_lang, back_lang, ease_factor, interval_days, repetitions, next_review
             FROM card WHERE next_review <= $1 ORDER BY next_review ASC;",
        )
        .bind(encode_ts(&now))
        .fetch_all(&self.conn)
        .await?;
        rows.iter().map(card_from_row).collect()
    }

    async fn save_schedule(&self, card_id: i64, schedule: &CardSchedule) -> Result<()> {
        sqlx::query(
            "UPDATE card SET ease_factor = $2, interval_days = $3, repetitions = $4, next_review = $5
             WHERE id = $1;",
        )
        .bind(card_id)
        .bind(schedule.ease_factor)
        .bind(i64::from(schedule.interval_days))
        .bind(i64::from(schedule.repetitions))
        .bind(encode_ts(&schedule.next_review))
        .execute(&self.conn)
        .await?;
        Ok(())
    }

    async fn record_review(&self, day: NaiveDate) -> Result<()> {
        sqlx::query(
            "INSERT INTO activity (day, reviews) VALUES ($1, 1)
             ON CONFLICT(day) DO UPDATE SET reviews = reviews + 1;",
        )
        .bind(day.to_string())
        .execute(&self.conn)
        .await?;
        Ok(())
    }
}

impl SqliteStore {
    pub async fn default() -> Self {
        Self::new(db_path()).await.unwrap()
    }

    async fn new(path: PathBuf) -> Result<Self> {
        if !Sqlite::database_exists(path.to_str().unwrap()).await? {
            Sqlite::create_database(path.to_str().unwrap()).await?;
        }
        let conn = conn(&path).await?;
        let store = Self { conn };
        store.check_schema().await?;
        Ok(store)
    }

    /// Private database for tests. A single connection, so every query sees
    /// the same in-memory file.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let conn = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { conn };
        store.check_schema().await?;
        Ok(store)
    }

    async fn check_schema(&self) -> Result<()> {
        let user_version = &sqlx::query("pragma user_version;")
            .fetch_all(&self.conn)
            .await?[0];
        let user_version: i32 = user_version.get(0);

        if user_version <= 0 {
            sqlx::raw_sql(
                "
BEGIN EXCLUSIVE;
PRAGMA auto_vacuum = INCREMENTAL;
CREATE TABLE card (
    id INTEGER PRIMARY KEY NOT NULL,
    front TEXT NOT NULL,
    back TEXT NOT NULL,
    note TEXT,
    front_lang TEXT,
    back_lang TEXT,
    ease_factor REAL NOT NULL,
    interval_days INTEGER NOT NULL,
    repetitions INTEGER NOT NULL,
    next_review TEXT NOT NULL
) STRICT;
CREATE INDEX card_due ON card (next_review);
CREATE TABLE activity (
    day TEXT PRIMARY KEY NOT NULL,
    reviews INTEGER NOT NULL
) STRICT;
PRAGMA user_version = 1;
COMMIT;
                 ",
            )
            .execute(&self.conn)
            .await?;
        }
        Ok(())
    }

    /// Insert a card with the new-card schedule: due immediately.
    pub async fn add_card(&self, draft: &CardDraft<'_>, now: DateTime<Utc>) -> Result<i64> {
        let schedule = CardSchedule::fresh(now);
        let id = sqlx::query(
            "INSERT INTO card (front, back, note, front_lang, back_lang, ease_factor, interval_days, repetitions, next_review)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id;",
        )
        .bind(draft.front)
        .bind(draft.back)
        .bind(draft.note)
        .bind(draft.front_lang)
        .bind(draft.back_lang)
        .bind(schedule.ease_factor)
        .bind(i64::from(schedule.interval_days))
        .bind(i64::from(schedule.repetitions))
        .bind(encode_ts(&schedule.next_review))
        .fetch_one(&self.conn)
        .await?
        .get::<i64, _>(0);
        Ok(id)
    }

    pub async fn delete_card(&self, card_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM card WHERE id = $1;")
            .bind(card_id)
            .execute(&self.conn)
            .await?;
        Ok(())
    }

    /// Review count recorded for `day`, 0 if none.
    pub async fn reviews_on(&self, day: NaiveDate) -> Result<i64> {
        let row = sqlx::query("SELECT reviews FROM activity WHERE day = $1;")
            .bind(day.to_string())
            .fetch_optional(&self.conn)
            .await?;
        Ok(row.map(|row| row.get(0)).unwrap_or(0))
    }
}

/// Card fields supplied by the caller; the schedule is not theirs to set.
#[derive(Debug, Default, Clone, Copy)]
pub struct CardDraft<'a> {
    pub front: &'a str,
    pub back: &'a str,
    pub note: Option<&'a str>,
    pub front_lang: Option<&'a str>,
    pub back_lang: Option<&'a str>,
}

fn card_from_row(row: &SqliteRow) -> Result<Card> {
    let next_review: String = row.get(9);
    Ok(Card {
        id: row.get(0),
        front: row.get(1),
        back: row.get(2),
        note: row.get(3),
        front_lang: row.get(4),
        back_lang: row.get(5),
        schedule: CardSchedule {
            ease_factor: row.get(6),
            interval_days: row.get::<i64, _>(7) as u32,
            repetitions: row.get::<i64, _>(8) as u32,
            next_review: DateTime::parse_from_rfc3339(&next_review)?.with_timezone(&Utc),
        },
    })
}

/// RFC 3339 UTC with a fixed-width fraction, so string order in SQL is
/// chronological order.
fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub async fn conn(path: &Path) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(path.to_str().unwrap())?;
    SqlitePoolOptions::new().connect_with(options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::INITIAL_EASE_FACTOR;
    use chrono::TimeZone;

    fn at(hms: (u32, u32, u32)) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hms.0, hms.1, hms.2).unwrap()
    }

    #[tokio::test]
    async fn fresh_card_is_due_immediately() {
        let store = SqliteStore::in_memory().await.unwrap();
        let now = at((12, 0, 0));
        let draft = CardDraft {
            front: "dom",
            back: "house",
            note: Some("building"),
            front_lang: Some("pl"),
            back_lang: Some("en-us"),
        };
        let id = store.add_card(&draft, now).await.unwrap();

        let due = store.due_cards(now).await.unwrap();
        assert_eq!(due.len(), 1);
        let card = &due[0];
        assert_eq!(card.id, id);
        assert_eq!(card.front, "dom");
        assert_eq!(card.back, "house");
        assert_eq!(card.note.as_deref(), Some("building"));
        assert_eq!(card.back_lang.as_deref(), Some("en-us"));
        assert_eq!(card.schedule.ease_factor, INITIAL_EASE_FACTOR);
        assert_eq!(card.schedule.interval_days, 0);
        assert_eq!(card.schedule.repetitions, 0);
        assert_eq!(card.schedule.next_review, now);
    }

    #[tokio::test]
    async fn due_query_orders_by_due_time_and_skips_future_cards() {
        let store = SqliteStore::in_memory().await.unwrap();
        let now = at((12, 0, 0));
        let a = store.add_card(&CardDraft { front: "a", back: "1", ..Default::default() }, now).await.unwrap();
        let b = store.add_card(&CardDraft { front: "b", back: "2", ..Default::default() }, now).await.unwrap();
        let c = store.add_card(&CardDraft { front: "c", back: "3", ..Default::default() }, now).await.unwrap();

        let overdue = CardSchedule { next_review: at((8, 0, 0)), ..CardSchedule::fresh(now) };
        let later = CardSchedule { next_review: at((10, 0, 0)), ..CardSchedule::fresh(now) };
        let future = CardSchedule { next_review: at((18, 0, 0)), ..CardSchedule::fresh(now) };
        store.save_schedule(b, &overdue).await.unwrap();
        store.save_schedule(a, &later).await.unwrap();
        store.save_schedule(c, &future).await.unwrap();

        let due = store.due_cards(now).await.unwrap();
        let ids: Vec<i64> = due.iter().map(|card| card.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn saved_schedule_round_trips() {
        let store = SqliteStore::in_memory().await.unwrap();
        let now = at((12, 0, 0));
        let id = store.add_card(&CardDraft { front: "q", back: "a", ..Default::default() }, now).await.unwrap();

        let schedule = CardSchedule {
            ease_factor: 2.36,
            interval_days: 9,
            repetitions: 4,
            next_review: at((9, 30, 15)),
        };
        store.save_schedule(id, &schedule).await.unwrap();

        let due = store.due_cards(at((23, 0, 0))).await.unwrap();
        assert_eq!(due[0].schedule, schedule);
    }

    #[tokio::test]
    async fn activity_counter_upserts() {
        let store = SqliteStore::in_memory().await.unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();

        assert_eq!(store.reviews_on(monday).await.unwrap(), 0);
        store.record_review(monday).await.unwrap();
        store.record_review(monday).await.unwrap();
        store.record_review(tuesday).await.unwrap();
        assert_eq!(store.reviews_on(monday).await.unwrap(), 2);
        assert_eq!(store.reviews_on(tuesday).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleted_cards_stop_coming_due() {
        let store = SqliteStore::in_memory().await.unwrap();
        let now = at((12, 0, 0));
        let id = store.add_card(&CardDraft { front: "q", back: "a", ..Default::default() }, now).await.unwrap();
        store.delete_card(id).await.unwrap();
        assert!(store.due_cards(now).await.unwrap().is_empty());
    }
}
