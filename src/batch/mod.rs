//! Parallel extraction over many screenshots.
//!
//! This module provides:
//! - A shared work queue feeding worker threads
//! - One OCR engine per worker, built by the caller
//! - Append-only CSV output as results arrive

pub mod queue;
pub mod worker;

pub use worker::BatchResult;

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::thread;

use crate::export::csv_writer::{append_entries, init_csv};
use crate::ocr::OcrEngine;
use crate::table::ExtractionContext;
use queue::{create_work_queue, WorkItem};
use worker::run_worker;

/// Processes `images` on `workers` threads and returns results in input order.
///
/// `make_engine` is called once per worker up front, so an unavailable OCR
/// engine fails the batch before any work starts. When `csv_path` is given,
/// entries are appended as each screenshot completes.
pub fn run_batch<E, F>(
    images: &[PathBuf],
    workers: usize,
    make_engine: F,
    ctx: ExtractionContext<'_>,
    csv_path: Option<&Path>,
) -> Result<Vec<BatchResult>>
where
    E: OcrEngine + Send,
    F: Fn() -> Result<E>,
{
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let workers = workers.clamp(1, images.len());

    let engines = (0..workers)
        .map(|_| make_engine())
        .collect::<Result<Vec<E>>>()?;

    if let Some(path) = csv_path {
        init_csv(path)?;
    }

    let (sender, receiver) = create_work_queue();
    for (index, path) in images.iter().enumerate() {
        sender
            .send(WorkItem::new(index, path.clone()))
            .map_err(|_| anyhow!("Work queue closed unexpectedly"))?;
    }
    drop(sender);

    log::info!(
        "Processing {} screenshots on {} workers",
        images.len(),
        workers
    );

    let (result_tx, result_rx) = channel::<BatchResult>();
    let mut results: Vec<BatchResult> = Vec::with_capacity(images.len());

    thread::scope(|s| {
        for (worker_id, engine) in engines.into_iter().enumerate() {
            let receiver = &receiver;
            let result_tx = result_tx.clone();
            s.spawn(move || run_worker(worker_id, &engine, receiver, result_tx, ctx));
        }
        drop(result_tx);

        for result in result_rx.iter() {
            if let (Some(path), Ok(extraction)) = (csv_path, &result.outcome) {
                if let Err(e) = append_entries(
                    path,
                    &result.image_path,
                    result.processed_at,
                    &extraction.entries,
                ) {
                    log::error!(
                        "Failed to write CSV for {}: {:#}",
                        result.image_path.display(),
                        e
                    );
                }
            }
            results.push(result);
        }
    });

    results.sort_by_key(|r| r.index);
    Ok(results)
}
