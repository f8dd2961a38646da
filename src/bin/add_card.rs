use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use flashdeck::store::sqlite_store::{CardDraft, SqliteStore};
use shadow_rs::shadow;
use tracing_subscriber::EnvFilter;

shadow!(build);

#[derive(Parser)]
#[command(version = build::VERSION, about = "Add a card, due immediately")]
struct Args {
    front: String,
    back: String,

    #[arg(long)]
    note: Option<String>,

    /// language tag for speaking the front, e.g. pl
    #[arg(long)]
    front_lang: Option<String>,

    /// language tag for speaking the back, e.g. en-us
    #[arg(long)]
    back_lang: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let store = SqliteStore::default().await;
    let draft = CardDraft {
        front: &args.front,
        back: &args.back,
        note: args.note.as_deref(),
        front_lang: args.front_lang.as_deref(),
        back_lang: args.back_lang.as_deref(),
    };
    let id = store.add_card(&draft, Utc::now()).await?;
    println!("added card {id}: {}", args.front);
    Ok(())
}
