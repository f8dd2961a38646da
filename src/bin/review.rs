use anyhow::Result;
use chrono::Local;
use clap::Parser;
use cursive::style::{BorderStyle, Palette};
use cursive::traits::*;
use cursive::views::{Button, Dialog, LinearLayout, TextView};
use cursive::{Cursive, CursiveExt};
use flashdeck::scheduler::Quality;
use flashdeck::session::{Phase, ReviewSession, SessionSummary};
use flashdeck::speech::EspeakSpeech;
use flashdeck::store::sqlite_store::SqliteStore;
use futures::executor::block_on;
use shadow_rs::shadow;
use tracing_subscriber::EnvFilter;

shadow!(build);

static DECK: &str = "deck";

type Session = ReviewSession<SqliteStore, EspeakSpeech>;

#[derive(Parser)]
#[command(version = build::VERSION, about = "Review the cards that are due")]
struct Args {}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    Args::parse();

    let store = SqliteStore::default().await;
    let session = ReviewSession::start(store, EspeakSpeech::new(), Local::now()).await;
    if session.is_complete() {
        println!("no cards due for review");
        return Ok(());
    }
    let first = session.current().unwrap().front.clone();

    let mut siv = Cursive::default();
    siv.set_user_data(session);

    siv.set_theme(cursive::theme::Theme {
        shadow: true,
        borders: BorderStyle::Simple,
        palette: Palette::retro().with(|palette| {
            use cursive::style::BaseColor::*;
            use cursive::style::Color::TerminalDefault;
            use cursive::style::PaletteColor::*;

            palette[Background] = TerminalDefault;
            palette[View] = TerminalDefault;
            palette[Primary] = White.dark();
            palette[TitlePrimary] = Blue.light();
            palette[Secondary] = Blue.light();
            palette[Highlight] = Blue.dark();
        }),
    });

    siv.add_fullscreen_layer(
        Dialog::new()
            .title(first)
            .content(front_layout())
            .h_align(cursive::align::HAlign::Center)
            .with_name(DECK),
    );

    siv.run();

    let session: Session = siv.take_user_data().unwrap();
    report(session.summary());
    Ok(())
}

enum Screen {
    Front { front: String },
    Back { front: String, back: String, note: Option<String> },
    Done,
}

fn refresh(s: &mut Cursive) {
    let screen = s
        .with_user_data(|session: &mut Session| match session.phase() {
            Phase::Complete => Screen::Done,
            Phase::Front => {
                let card = session.current().unwrap();
                Screen::Front {
                    front: card.front.clone(),
                }
            }
            Phase::Back => {
                let card = session.current().unwrap();
                Screen::Back {
                    front: card.front.clone(),
                    back: card.back.clone(),
                    note: card.note.clone(),
                }
            }
        })
        .unwrap();

    match screen {
        Screen::Done => s.quit(),
        Screen::Front { front } => {
            s.call_on_name(DECK, |view: &mut Dialog| {
                view.set_title(front);
                view.set_content(front_layout());
            });
        }
        Screen::Back { front, back, note } => {
            s.call_on_name(DECK, |view: &mut Dialog| {
                view.set_title(front);
                view.set_content(back_layout(&back, note.as_deref()));
            });
        }
    }
}

fn reveal_cb(s: &mut Cursive) {
    s.with_user_data(|session: &mut Session| block_on(session.flip()));
    refresh(s);
}

fn flip_back_cb(s: &mut Cursive) {
    s.with_user_data(|session: &mut Session| block_on(session.flip_back()));
    refresh(s);
}

fn skip_cb(s: &mut Cursive) {
    s.with_user_data(|session: &mut Session| session.skip());
    refresh(s);
}

fn rate_cb(s: &mut Cursive, quality: Quality) {
    s.with_user_data(|session: &mut Session| {
        let _ = block_on(session.rate(quality, Local::now()));
    });
    refresh(s);
}

fn front_layout() -> LinearLayout {
    LinearLayout::horizontal()
        .child(Button::new("Skip", skip_cb))
        .child(TextView::new("   "))
        .child(Button::new("Show answer", reveal_cb))
        .child(TextView::new("   "))
        .child(Button::new("Quit", |s| {
            s.quit();
        }))
}

fn back_layout(back: &str, note: Option<&str>) -> LinearLayout {
    let mut layout = LinearLayout::vertical().child(TextView::new(back));
    if let Some(note) = note {
        layout.add_child(TextView::new(note));
    }
    layout.add_child(TextView::new(" "));
    layout.add_child(
        LinearLayout::horizontal()
            .child(Button::new("Front", flip_back_cb))
            .child(TextView::new("   "))
            .child(Button::new("Again", |s| rate_cb(s, Quality::Again)))
            .child(TextView::new(" "))
            .child(Button::new("Hard", |s| rate_cb(s, Quality::Hard)))
            .child(TextView::new(" "))
            .child(Button::new("Hesitant", |s| rate_cb(s, Quality::Hesitant)))
            .child(TextView::new(" "))
            .child(Button::new("Good", |s| rate_cb(s, Quality::Good)))
            .child(TextView::new(" "))
            .child(Button::new("Easy", |s| rate_cb(s, Quality::Easy)))
            .child(TextView::new("   "))
            .child(Button::new("Quit", |s| {
                s.quit();
            })),
    );
    layout
}

fn report(summary: SessionSummary) {
    if summary.nothing_due {
        println!("nothing was due");
        return;
    }
    let stats = summary.stats;
    println!(
        "reviewed {} cards: {} correct, {} incorrect ({}% accuracy)",
        stats.reviewed,
        stats.correct,
        stats.incorrect,
        stats.accuracy()
    );
}
