pub mod scheduler;
pub mod session;
pub mod speech;
pub mod store;

use anyhow::Context;
use std::fs::create_dir;
use std::path::PathBuf;

pub fn data_dir() -> PathBuf {
    let path = dirs::data_local_dir().unwrap().join("flashdeck");
    if !path.exists() {
        create_dir(&path)
            .with_context(|| format!("Failed to create directory {:?}", path))
            .unwrap();
    }
    path
}

pub fn db_path() -> PathBuf {
    data_dir().join("cards.db")
}
