//! Replays scripted drags against a demo deck and prints what happened.

mod demo;
mod script;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use parking_lot::Mutex;
use serde::Serialize;
use swipedeck_core::{DeckController, EmptyStatePresentation, SwipeDirection};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::demo::{DemoCard, DemoGenerator};
use crate::script::{DragInput, DragRecord, ReplayOptions};

#[derive(Parser, Debug)]
#[command(
    name = "swipedeck-sim",
    about = "Replay scripted drags against a demo swipe deck"
)]
struct Cli {
    /// Config file (TOML or JSON). Defaults to $SWIPEDECK_CONFIG_PATH,
    /// $SWIPEDECK_CONFIG_JSON, then ./swipedeck.toml and friends.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Drag the front card by `dx,dy`. Repeat for several gestures.
    #[arg(long = "drag", value_name = "DX,DY", allow_hyphen_values = true)]
    drags: Vec<DragInput>,
    /// Pointer events each drag is split into
    #[arg(long, default_value_t = 10)]
    steps: u32,
    /// Frame length in ms; defaults to the configured tick interval
    #[arg(long)]
    frame_ms: Option<u64>,
    /// Remove this many cards without swiping after the drags
    #[arg(long, default_value_t = 0)]
    skip: u32,
    /// Stop generating cards after this many
    #[arg(long)]
    generate: Option<u32>,
    /// Ask for new filters at the end (only honoured on an empty deck)
    #[arg(long)]
    change_filters: bool,
    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,
    /// Emit a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
struct SwipeEntry {
    id: i64,
    name: String,
    direction: SwipeDirection,
}

#[derive(Debug, Serialize)]
struct Report {
    drags: Vec<DragRecord>,
    swipes: Vec<SwipeEntry>,
    skipped: Vec<DemoCard>,
    deck: Vec<DemoCard>,
    empty_state: Option<EmptyStatePresentation>,
    change_filters: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let loaded = swipedeck_config::load(cli.config.as_deref())?;
    if cli.print_config {
        print!("{}", swipedeck_config::to_toml_string(&loaded.config)?);
        return Ok(());
    }

    let options = ReplayOptions {
        steps: cli.steps,
        frame: Duration::from_millis(
            cli.frame_ms
                .unwrap_or(loaded.config.trajectory.tick_interval_ms)
                .max(1),
        ),
        max_frames: loaded.config.trajectory.max_commit_ticks.max(1) * 4,
    };

    let swipes = Arc::new(Mutex::new(Vec::new()));
    let swipe_log = Arc::clone(&swipes);
    let filters_requested = Arc::new(Mutex::new(false));
    let filters_flag = Arc::clone(&filters_requested);

    let mut deck = DeckController::load(
        demo::seed_cards(),
        Arc::new(DemoGenerator::new(cli.generate)),
        loaded.config,
    )
    .await
    .with_on_swipe(move |card: &DemoCard, direction| {
        swipe_log.lock().push(SwipeEntry {
            id: card.id,
            name: card.name.clone(),
            direction,
        });
    })
    .with_on_change_filters(move || {
        *filters_flag.lock() = true;
    });
    info!(source = %loaded.source, drags = cli.drags.len(), "deck ready");

    let drags = script::replay(&mut deck, &cli.drags, &options).await?;

    let mut skipped = Vec::new();
    for _ in 0..cli.skip {
        let Some(card) = deck.skip_front() else {
            break;
        };
        skipped.push(card.as_ref().clone());
        deck.queue().settle().await;
        deck.advance(Duration::ZERO);
    }

    let change_filters = cli.change_filters.then(|| {
        deck.request_change_filters();
        *filters_requested.lock()
    });

    let view = deck.view();
    let report = Report {
        drags,
        swipes: swipes.lock().clone(),
        skipped,
        deck: view.cards.iter().map(|c| c.item.as_ref().clone()).collect(),
        empty_state: view.empty_state,
        change_filters,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

fn print_text(report: &Report) {
    for drag in &report.drags {
        println!("{drag}");
    }
    for swipe in &report.swipes {
        println!("swiped {} (#{}) {}", swipe.name, swipe.id, swipe.direction);
    }
    for card in &report.skipped {
        println!("skipped {} (#{})", card.name, card.id);
    }
    match &report.change_filters {
        Some(true) => println!("change filters requested"),
        Some(false) => println!("change filters ignored: cards remain"),
        None => {}
    }

    match &report.empty_state {
        Some(presentation) => {
            let shown = match presentation {
                EmptyStatePresentation::Animation(res) => {
                    format!("animation {res}")
                }
                EmptyStatePresentation::Image(res) => format!("image {res}"),
                EmptyStatePresentation::DefaultIcon => "default icon".into(),
            };
            println!("deck empty ({shown})");
        }
        None => {
            println!("deck: {} cards", report.deck.len());
            for (position, card) in report.deck.iter().enumerate() {
                println!(
                    "  {}. {} (#{}) {}",
                    position + 1,
                    card.name,
                    card.id,
                    card.image_url
                );
            }
        }
    }
}
