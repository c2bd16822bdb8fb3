//! Parallel pair-frequency counting over a symbol stream.
//!
//! See spec §4.4. Workers are raw scoped threads synchronised with a
//! [`std::sync::Barrier`] and a [`std::sync::Mutex`]-guarded chunk cursor,
//! mirroring `original_source/bpe/src/bpe.c`'s `get_freq` (`pthread_barrier_t`
//! + `pthread_mutex_t chunk_mutex`) directly rather than going through a
//! work-stealing pool abstraction: the hybrid static/dynamic partitioning
//! scheme below *is* the thing being specified, so `rayon`'s implicit
//! scheduler is the wrong fit and is not used here.

use crate::error::{Error, Result};
use crate::pair_count_map::PairCountMap;
use crate::types::{Pair, Symbol};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Barrier, Mutex};

/// Below this many bytes per worker, chunks are assigned once, up front
/// (static partitioning). At or above it, workers pull from a shared
/// cursor in [`CHUNK_SIZE`]-sized increments (dynamic partitioning).
/// Matches `CHUNK_SIZE` in the source.
const CHUNK_SIZE: usize = 64 * 1024;

/// Default worker count absent an explicit override: available
/// parallelism, capped at the source's fixed `THREAD_NO`.
const MAX_WORKERS: usize = 16;

/// Counts adjacent-symbol-pair frequencies across `symbols`, splitting the
/// work across `workers` scoped threads (or a sensible default if `None`).
///
/// Returns an empty map for inputs shorter than 2 symbols; this is a valid
/// counting result, not an error — callers enforce the 2-byte input
/// minimum earlier in the pipeline (see [`crate::error::Error::InputTooShort`]).
pub fn count_pairs(symbols: &[Symbol], workers: Option<usize>) -> Result<PairCountMap> {
    if symbols.len() < 2 {
        return PairCountMap::with_capacity(0);
    }

    let worker_count = workers
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
        .clamp(1, MAX_WORKERS)
        .min(symbols.len());

    log::debug!(
        "counting pairs over {} symbols with {} workers",
        symbols.len(),
        worker_count
    );

    let mut per_thread_tables = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        per_thread_tables.push(Mutex::new(PairCountMap::with_capacity(1 << 12)?));
    }

    let next_chunk_index = Mutex::new(0usize);
    let barrier = Barrier::new(worker_count);
    let static_partition = symbols.len() < CHUNK_SIZE * worker_count;
    // Set by any worker that hits an allocation failure; every other
    // worker checks it at its next chunk fetch and stops, per spec §4.4's
    // cancellation policy.
    let abort = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for (thread_idx, table) in per_thread_tables.iter().enumerate() {
            let barrier = &barrier;
            let next_chunk_index = &next_chunk_index;
            let abort = &abort;
            scope.spawn(move || {
                barrier.wait();

                if static_partition {
                    let per_thread_len = symbols.len() / worker_count;
                    let start = thread_idx * per_thread_len;
                    let chunk_len = if thread_idx == worker_count - 1 {
                        per_thread_len + symbols.len() % worker_count
                    } else {
                        per_thread_len
                    };
                    if count_range(symbols, start, chunk_len, &mut table.lock().unwrap()).is_err()
                    {
                        abort.store(true, Ordering::Relaxed);
                    }
                } else {
                    loop {
                        if abort.load(Ordering::Relaxed) {
                            break;
                        }
                        let start = {
                            let mut cursor = next_chunk_index.lock().unwrap();
                            let start = *cursor;
                            if start >= symbols.len() {
                                break;
                            }
                            let chunk_len = CHUNK_SIZE.min(symbols.len() - start);
                            *cursor += chunk_len;
                            start
                        };
                        let chunk_len = CHUNK_SIZE.min(symbols.len() - start);
                        if count_range(symbols, start, chunk_len, &mut table.lock().unwrap())
                            .is_err()
                        {
                            abort.store(true, Ordering::Relaxed);
                            break;
                        }
                    }
                }
            });
        }
    });

    if abort.into_inner() {
        return Err(Error::OutOfMemory);
    }

    let tables: Vec<PairCountMap> = per_thread_tables
        .into_iter()
        .map(|m| m.into_inner().unwrap())
        .collect();

    PairCountMap::merge(&tables, |a, b| a + b)
}

fn count_range(
    symbols: &[Symbol],
    start: usize,
    chunk_len: usize,
    table: &mut PairCountMap,
) -> Result<()> {
    let end = (start + chunk_len).min(symbols.len());
    for i in start..end {
        if i + 1 >= symbols.len() {
            break;
        }
        let pair = Pair::new(symbols[i], symbols[i + 1]);
        let count = table.get_or_zero(pair);
        table.put(pair, count + 1)?;
    }
    Ok(())
}
