use crate::payload::Payload;

/// A unit of work plugged into a pool, pipeline, or DAG node.
///
/// Implementors provide two capabilities: `invoke`, the work itself, and
/// `clone_box`, deterministic replication. Every worker in a pool runs its
/// own clone, so implementations must not assume shared mutable state across
/// clones.
///
/// A panic inside `invoke` is a component failure. Pools do not catch it: the
/// panic unwinds the worker thread that was running the clone, and the pool
/// neither restarts nor reports the lost worker.
pub trait Component: Send + 'static {
    /// Transform one payload into the next.
    fn invoke(&self, payload: Payload) -> Payload;

    /// Replicate this component for another worker.
    fn clone_box(&self) -> Box<dyn Component>;

    fn name(&self) -> &str;
}

impl Clone for Box<dyn Component> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
