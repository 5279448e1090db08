//! Worker threads for fanning chunk generation out across cores.
//!
//! Requests go out nearest-first over a bounded crossbeam channel; results come
//! back on an unbounded one so a worker never blocks while the caller is
//! still queueing requests.

use std::panic;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::core::chunk::{Chunk, ChunkKey};
use crate::world::generator::ChunkGenerator;

const REQUEST_QUEUE: usize = 256;

pub struct ChunkGenRequest {
    pub key: ChunkKey,
}

/// One reply per request. `chunk` is `None` when generation panicked.
pub struct ChunkGenResult {
    pub key: ChunkKey,
    pub chunk: Option<Chunk>,
}

pub struct GenerationPool {
    request_tx: Option<Sender<ChunkGenRequest>>,
    result_rx: Receiver<ChunkGenResult>,
    workers: Vec<JoinHandle<()>>,
}

impl GenerationPool {
    pub fn new(num_workers: usize, generator: Arc<ChunkGenerator>) -> std::io::Result<Self> {
        let (request_tx, request_rx) = bounded::<ChunkGenRequest>(REQUEST_QUEUE);
        let (result_tx, result_rx) = unbounded::<ChunkGenResult>();

        let mut workers = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let generator = Arc::clone(&generator);

            let handle = thread::Builder::new()
                .name(format!("chunk-gen-{}", worker_id))
                .spawn(move || {
                    while let Ok(req) = rx.recv() {
                        let chunk = panic::catch_unwind(|| generator.generate_chunk(req.key)).ok();
                        if chunk.is_none() {
                            tracing::error!(
                                "Generating chunk ({}, {}) panicked on worker {}",
                                req.key.x,
                                req.key.z,
                                worker_id
                            );
                        }
                        if tx.send(ChunkGenResult { key: req.key, chunk }).is_err() {
                            // Pool was dropped mid-batch
                            break;
                        }
                    }
                })?;
            workers.push(handle);
        }

        tracing::info!("Chunk generation pool started with {} workers", num_workers);

        Ok(GenerationPool {
            request_tx: Some(request_tx),
            result_rx,
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Generates `keys` on the workers and waits for the batch. Keys are
    /// dispatched in the given order. Chunks whose generation panicked, or
    /// that were never delivered because the workers went away, are missing
    /// from the result and left to the caller.
    pub fn generate(&self, keys: &[ChunkKey]) -> Vec<(ChunkKey, Chunk)> {
        let Some(request_tx) = self.request_tx.as_ref() else {
            return Vec::new();
        };
        if self.workers.is_empty() || keys.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::with_capacity(keys.len());
        let mut replies = 0;
        let mut sent = 0;
        for &key in keys {
            // Drain while queueing so large batches keep memory flat
            while let Ok(result) = self.result_rx.try_recv() {
                replies += 1;
                collect_result(&mut results, result);
            }
            if request_tx.send(ChunkGenRequest { key }).is_err() {
                tracing::error!(
                    "Chunk generation workers disconnected after {} of {} requests",
                    sent,
                    keys.len()
                );
                break;
            }
            sent += 1;
        }

        while replies < sent {
            match self.result_rx.recv() {
                Ok(result) => {
                    replies += 1;
                    collect_result(&mut results, result);
                }
                Err(_) => {
                    tracing::warn!(
                        "Chunk generation pool lost {} chunks, falling back to inline generation",
                        sent - replies
                    );
                    break;
                }
            }
        }

        tracing::debug!("Pool generated {} chunks", results.len());
        results
    }
}

fn collect_result(results: &mut Vec<(ChunkKey, Chunk)>, result: ChunkGenResult) {
    if let Some(chunk) = result.chunk {
        results.push((result.key, chunk));
    }
}

impl Drop for GenerationPool {
    fn drop(&mut self) {
        // Closing the request channel ends every worker loop
        self.request_tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Chunk generation worker panicked");
            }
        }
    }
}
