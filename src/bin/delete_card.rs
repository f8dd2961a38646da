use anyhow::Result;
use clap::Parser;
use flashdeck::store::sqlite_store::SqliteStore;
use shadow_rs::shadow;
use tracing_subscriber::EnvFilter;

shadow!(build);

#[derive(Parser)]
#[command(version = build::VERSION, about = "Delete cards by id")]
struct Args {
    ids: Vec<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let store = SqliteStore::default().await;
    for id in args.ids {
        store.delete_card(id).await?;
    }
    Ok(())
}
