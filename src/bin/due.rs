use anyhow::Result;
use chrono::{Local, Utc};
use clap::Parser;
use flashdeck::store::sqlite_store::SqliteStore;
use flashdeck::store::ScheduleStore;
use shadow_rs::shadow;
use tracing_subscriber::EnvFilter;

shadow!(build);

#[derive(Parser)]
#[command(version = build::VERSION, about = "Show what is waiting for review")]
struct Args {
    /// list the due fronts instead of the count
    #[arg(long, default_value_t = false)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let store = SqliteStore::default().await;
    let due = store.due_cards(Utc::now()).await?;
    if args.list {
        for card in &due {
            println!("{}", card.front);
        }
        return Ok(());
    }
    let today = store.reviews_on(Local::now().date_naive()).await?;
    println!("{} cards due, {} reviewed today", due.len(), today);
    Ok(())
}
