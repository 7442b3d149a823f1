//! Scripted drags replayed against a live controller.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::bail;
use serde::Serialize;
use swipedeck_core::{DeckController, ItemId, Outcome, SwipeItem};
use tracing::{debug, warn};

/// One drag gesture, as total displacement from where the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragInput {
    pub dx: f32,
    pub dy: f32,
}

impl FromStr for DragInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dx, dy) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `dx,dy`, got `{s}`"))?;
        let parse = |raw: &str| {
            raw.trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("`{}` is not a finite number", raw.trim()))
        };
        Ok(Self {
            dx: parse(dx)?,
            dy: parse(dy)?,
        })
    }
}

impl fmt::Display for DragInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.dx, self.dy)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    /// Pointer events each drag is split into.
    pub steps: u32,
    pub frame: Duration,
    pub max_frames: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DragRecord {
    pub index: usize,
    pub card: Option<i64>,
    pub overlay: Option<String>,
    pub outcome: String,
    pub frames: u32,
}

impl fmt::Display for DragRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.card {
            Some(card) => write!(
                f,
                "drag {}: card {card} -> {} ({} frames",
                self.index + 1,
                self.outcome,
                self.frames
            )?,
            None => return write!(f, "drag {}: {}", self.index + 1, self.outcome),
        }
        if let Some(label) = &self.overlay {
            write!(f, ", overlay {label}")?;
        }
        f.write_str(")")
    }
}

/// Play every drag against the current front card, running each release
/// animation to completion and letting refills land before the next drag.
pub async fn replay<T>(
    deck: &mut DeckController<T>,
    drags: &[DragInput],
    options: &ReplayOptions,
) -> anyhow::Result<Vec<DragRecord>>
where
    T: SwipeItem + Send + Sync + 'static,
{
    let mut records = Vec::with_capacity(drags.len());

    for (index, drag) in drags.iter().enumerate() {
        let Some(id) = deck.queue().front_id() else {
            warn!(index, "deck is empty; drag dropped");
            records.push(DragRecord {
                index,
                card: None,
                overlay: None,
                outcome: "no card".to_string(),
                frames: 0,
            });
            continue;
        };

        let record = match perform(deck, index, id, *drag, options) {
            Ok(record) => record,
            Err(err) => {
                warn!(index, %id, error = %err, "drag rejected");
                DragRecord {
                    index,
                    card: Some(id.0),
                    overlay: None,
                    outcome: "rejected".to_string(),
                    frames: 0,
                }
            }
        };
        if deck.is_animating() {
            bail!(
                "drag {} did not finish within {} frames",
                index + 1,
                options.max_frames
            );
        }
        debug!(index, outcome = %record.outcome, frames = record.frames, "drag replayed");
        records.push(record);

        deck.queue().settle().await;
        deck.advance(Duration::ZERO);
    }

    Ok(records)
}

fn perform<T>(
    deck: &mut DeckController<T>,
    index: usize,
    id: ItemId,
    drag: DragInput,
    options: &ReplayOptions,
) -> swipedeck_core::Result<DragRecord>
where
    T: SwipeItem + Send + Sync + 'static,
{
    let steps = options.steps.max(1);
    let (dx, dy) = (drag.dx / steps as f32, drag.dy / steps as f32);

    deck.drag_start(id)?;
    for _ in 0..steps {
        deck.drag_delta(id, dx, dy)?;
    }
    let overlay = deck.overlay().label;
    let outcome = deck.drag_end(id)?;

    let mut frames = 0;
    while frames < options.max_frames {
        frames += 1;
        if !deck.advance(options.frame).animating {
            break;
        }
    }

    Ok(DragRecord {
        index,
        card: Some(id.0),
        overlay,
        outcome: match outcome {
            Outcome::Commit(direction) => format!("commit {direction}"),
            Outcome::Cancel => "cancel".to_string(),
        },
        frames,
    })
}
