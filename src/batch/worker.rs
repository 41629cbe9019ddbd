//! Worker loop: pull a screenshot, OCR it, extract, report.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use super::queue::{next_item, SharedReceiver, WorkItem};
use crate::ocr::OcrEngine;
use crate::table::{extract_from_lines, Extraction, ExtractionContext};

/// Outcome for one screenshot.
#[derive(Debug)]
pub struct BatchResult {
    pub index: usize,
    pub image_path: PathBuf,
    pub processed_at: DateTime<Local>,
    pub outcome: Result<Extraction>,
}

fn process_item(engine: &impl OcrEngine, item: &WorkItem, ctx: ExtractionContext<'_>) -> Result<Extraction> {
    let image = image::open(&item.image_path)
        .context(format!("Failed to open image: {}", item.image_path.display()))?;
    let lines = engine
        .recognize(&image)
        .context(format!("OCR failed for {}", item.image_path.display()))?;
    Ok(extract_from_lines(&lines, Some(image.width() as f32), ctx))
}

/// Runs the worker loop until the queue is closed and drained.
///
/// A failing screenshot is reported and the loop moves on. Returns when the
/// queue closes or the result receiver has gone away.
pub fn run_worker(
    worker_id: usize,
    engine: &impl OcrEngine,
    receiver: &SharedReceiver,
    results: Sender<BatchResult>,
    ctx: ExtractionContext<'_>,
) {
    log::debug!("Worker {} started", worker_id);

    while let Some(item) = next_item(receiver) {
        log::info!(
            "Worker {}: processing {} (queued {})",
            worker_id,
            item.image_path.display(),
            item.queued_at.format("%H:%M:%S%.3f")
        );

        let outcome = process_item(engine, &item, ctx);
        if let Err(e) = &outcome {
            log::error!("Worker {}: {:#}", worker_id, e);
        }

        let result = BatchResult {
            index: item.index,
            image_path: item.image_path,
            processed_at: Local::now(),
            outcome,
        };
        if results.send(result).is_err() {
            log::warn!("Worker {}: result channel closed, exiting", worker_id);
            break;
        }
    }

    log::debug!("Worker {} finished", worker_id);
}
