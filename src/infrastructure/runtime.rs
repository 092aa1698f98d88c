//! Task spawners

use std::collections::VecDeque;
use std::sync::Mutex;
use futures_util::future::BoxFuture;
use crate::domain::traits::Spawner;

/// Spawns detached tasks on the ambient tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl Spawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}

/// Queues tasks and runs them one at a time, in submission order, when asked.
///
/// Gives tests a deterministic schedule for dispatch and handler tasks.
#[derive(Default)]
pub struct ManualSpawner {
    tasks: Mutex<VecDeque<BoxFuture<'static, ()>>>,
}

impl ManualSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.tasks.lock()
            .map(|t| t.len())
            .unwrap_or(0)
    }

    /// Run queued tasks, including ones they spawn, until the queue is empty.
    /// Returns how many tasks ran.
    pub async fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = match self.tasks.lock() {
                Ok(mut tasks) => tasks.pop_front(),
                Err(_) => None,
            };
            let Some(task) = next else {
                return ran;
            };
            task.await;
            ran += 1;
        }
    }
}

impl Spawner for ManualSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push_back(task);
        }
    }
}
