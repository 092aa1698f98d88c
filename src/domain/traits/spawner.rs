use futures_util::future::BoxFuture;

/// Schedules detached units of work.
///
/// Nothing is awaited or returned: a spawned task runs to completion (or
/// hangs) on its own.
pub trait Spawner: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}
