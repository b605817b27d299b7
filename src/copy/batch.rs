//! Bounded fan-out for a directory's children.
//!
//! A [`Batcher`] launches jobs as they are pulled from an iterator, at most
//! `batch_size` at a time, and joins every job of a batch before launching
//! the next one. Jobs run on the current rayon pool; a thread blocked at a
//! batch boundary keeps executing queued work, so nested batches (a child
//! directory batching its own children) do not starve the pool.

/// Per-directory concurrency bound.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Batcher {
    batch_size: usize,
}

/// What a [`Batcher::run`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    /// Jobs launched
    pub jobs: usize,
    /// Non-empty batches joined
    pub batches: usize,
}

impl Batcher {
    pub(crate) fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Run every job from `jobs` through `work`, batch by batch.
    ///
    /// Returns only after the last (possibly partial) batch has been joined.
    pub(crate) fn run<I, F>(&self, jobs: I, work: F) -> BatchSummary
    where
        I: Iterator + Send,
        I::Item: Send,
        F: Fn(I::Item) + Sync,
    {
        let mut jobs = jobs;
        let work = &work;
        let mut summary = BatchSummary::default();

        loop {
            let launched = rayon::scope(|s| {
                let mut launched = 0;
                for job in jobs.by_ref().take(self.batch_size) {
                    s.spawn(move |_| work(job));
                    launched += 1;
                }
                launched
            });

            if launched > 0 {
                summary.jobs += launched;
                summary.batches += 1;
                tracing::trace!(launched, batch = summary.batches, "batch joined");
            }
            if launched < self.batch_size {
                return summary;
            }
        }
    }
}
