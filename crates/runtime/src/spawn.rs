use std::future::Future;

use futures::task::{LocalSpawn, LocalSpawnExt};

/// Spawns a fire-and-forget task on `spawner`.
///
/// The task is expected to do its own error handling; a spawner that refuses
/// the task (e.g. a shut-down executor) is logged and reported as `false`.
pub fn spawn_detached<F>(spawner: &dyn LocalSpawn, label: &'static str, fut: F) -> bool
where
    F: Future<Output = ()> + 'static,
{
    match spawner.spawn_local(fut) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(task = label, error = %err, "failed to spawn task");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::spawn_detached;
    use futures::executor::LocalPool;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn runs_on_local_pool() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let hit = Rc::new(Cell::new(false));
        let flag = Rc::clone(&hit);
        assert!(spawn_detached(&spawner, "test", async move {
            flag.set(true);
        }));
        assert!(!hit.get());
        pool.run_until_stalled();
        assert!(hit.get());
    }
}
