use super::error::EngineError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, trace};

/// A task that panicked instead of returning. The panic is contained to the
/// task; its siblings and the pool keep running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPanic {
    /// Position of the task in the submitted list.
    pub index: usize,
    pub message: String,
}

pub type TaskResult<R> = Result<R, TaskPanic>;

/// A fixed-size set of workers that drain one shared FIFO queue.
///
/// Every submitted item is handed to exactly one worker exactly once. At most
/// `worker_count` items are in flight at any moment. [`WorkerPool::run`]
/// returns only after the queue is empty and every worker is idle.
pub struct WorkerPool {
    pool: ThreadPool,
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Result<Self, EngineError> {
        if worker_count == 0 {
            return Err(EngineError::PoolStart(
                "worker count must be at least 1".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("epibind-worker-{}", i))
            .build()
            .map_err(|e| EngineError::PoolStart(e.to_string()))?;

        debug!(worker_count, "Worker pool started.");
        Ok(Self { pool, worker_count })
    }

    /// Runs `work` once per item and collects the results in submission order.
    ///
    /// Completion order across workers is unspecified. A panic inside `work`
    /// is caught and reported as a [`TaskPanic`] for that item alone.
    pub fn run<T, R, F>(&self, items: Vec<T>, work: F) -> Vec<TaskResult<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        self.run_with_hook(items, work, |_| {})
    }

    /// Like [`WorkerPool::run`], calling `on_complete` on the worker thread as
    /// soon as each item finishes, whether it returned or panicked.
    pub fn run_with_hook<T, R, F, C>(
        &self,
        items: Vec<T>,
        work: F,
        on_complete: C,
    ) -> Vec<TaskResult<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
        C: Fn(&TaskResult<R>) + Sync,
    {
        if items.is_empty() {
            return Vec::new();
        }

        let total = items.len();
        let queue = Mutex::new(items.into_iter().enumerate());
        let results: Mutex<Vec<(usize, TaskResult<R>)>> = Mutex::new(Vec::with_capacity(total));
        let active_workers = self.worker_count.min(total);

        self.pool.scope(|scope| {
            for worker_id in 0..active_workers {
                let queue = &queue;
                let results = &results;
                let work = &work;
                let on_complete = &on_complete;

                scope.spawn(move |_| {
                    let mut handled = 0usize;
                    loop {
                        let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
                        let Some((index, item)) = next else {
                            break;
                        };

                        let result = panic::catch_unwind(AssertUnwindSafe(|| work(item)))
                            .map_err(|payload| TaskPanic {
                                index,
                                message: panic_message(payload.as_ref()),
                            });
                        on_complete(&result);

                        results
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push((index, result));
                        handled += 1;
                    }
                    trace!(worker_id, handled, "Worker found the queue empty and stopped.");
                });
            }
        });

        let mut results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
        results.sort_unstable_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked with a non-string payload".to_string()
    }
}
