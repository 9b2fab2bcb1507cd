//! Batch tokenization over many matches.
//!
//! Matches are independent, so each one is loaded and tokenized as its own
//! task with fresh state. A failing match yields an error outcome and the
//! rest of the batch continues.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::TokenizerConfig;
use crate::source::{MatchSource, SourceError};
use crate::tokenizer::{TokenMatrix, TokenizeError, Tokenizer};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result of one match in a batch.
#[derive(Debug)]
pub struct MatchOutcome {
    /// Position of the source in the batch input.
    pub index: usize,
    pub source: MatchSource,
    /// Largest per-period minute of the match, for validating its minute slot.
    pub max_minute: u64,
    pub result: Result<TokenMatrix, MatchError>,
}

/// Loads and tokenizes one match.
pub fn process_match(index: usize, source: &MatchSource, tokenizer: &Tokenizer) -> MatchOutcome {
    let mut max_minute = 1;
    let result = source
        .load()
        .map_err(MatchError::from)
        .and_then(|events| {
            max_minute = crate::clock::MatchClock::scan(&events).max_minute();
            tokenizer.tokenize(&events).map_err(MatchError::from)
        });
    MatchOutcome {
        index,
        source: source.clone(),
        max_minute,
        result,
    }
}

/// Tokenizes every source, returning outcomes in input order.
pub fn run_batch(
    sources: &[MatchSource],
    config: &TokenizerConfig,
) -> Result<Vec<MatchOutcome>, BatchError> {
    let mut outcomes = Vec::with_capacity(sources.len());
    run_batch_with_callback(sources, config, |o| outcomes.push(o))?;
    outcomes.sort_by_key(|o| o.index);
    Ok(outcomes)
}

/// Tokenizes every source, calling `on_match` as each match completes.
///
/// With `config.threads > 1` matches run concurrently and outcomes arrive in
/// completion order.
pub fn run_batch_with_callback<F>(
    sources: &[MatchSource],
    config: &TokenizerConfig,
    on_match: F,
) -> Result<(), BatchError>
where
    F: FnMut(MatchOutcome) + Send,
{
    if config.threads > 1 {
        run_parallel(sources, config, on_match)
    } else {
        run_sequential(sources, config, on_match);
        Ok(())
    }
}

fn run_sequential<F>(sources: &[MatchSource], config: &TokenizerConfig, mut on_match: F)
where
    F: FnMut(MatchOutcome),
{
    let tokenizer = Tokenizer::new(config.layout);
    for (i, source) in sources.iter().enumerate() {
        let start = Instant::now();
        let outcome = process_match(i, source, &tokenizer);
        log_outcome(&outcome, i + 1, sources.len(), start);
        on_match(outcome);
    }
}

/// Runs matches on a rayon pool and delivers outcomes to the callback on the
/// calling thread through a channel.
fn run_parallel<F>(
    sources: &[MatchSource],
    config: &TokenizerConfig,
    mut on_match: F,
) -> Result<(), BatchError>
where
    F: FnMut(MatchOutcome) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let tokenizer = Tokenizer::new(config.layout);
    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<MatchOutcome>();

    std::thread::scope(|s| {
        s.spawn(|| {
            pool.install(|| {
                sources
                    .par_iter()
                    .enumerate()
                    .for_each_with(tx, |tx, (i, source)| {
                        let start = Instant::now();
                        let outcome = process_match(i, source, &tokenizer);
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_outcome(&outcome, n, sources.len(), start);
                        let _ = tx.send(outcome);
                    });
            });
        });

        for outcome in rx {
            on_match(outcome);
        }
    });
    Ok(())
}

fn log_outcome(outcome: &MatchOutcome, n: usize, total: usize, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    match &outcome.result {
        Ok(matrix) => info!(
            "match {}/{}: {} -> {} rows ({:.2}s)",
            n,
            total,
            outcome.source,
            matrix.len(),
            elapsed
        ),
        Err(e) => warn!("match {}/{}: {} failed: {}", n, total, outcome.source, e),
    }
}
