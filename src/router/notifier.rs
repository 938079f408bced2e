use tokio::sync::broadcast;

use crate::router::ResourceAddress;

pub const DEFAULT_CAPACITY: usize = 64;

/// Invalidation signal: the rows behind `address` changed and readers should
/// query again. The new data itself is never pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub address: ResourceAddress,
}

impl ChangeEvent {
    /// Whether an observer watching `watched` should re-query.
    pub fn concerns(&self, watched: &ResourceAddress) -> bool {
        watched.contains(&self.address) || self.address.contains(watched)
    }
}

#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn notify(&self, address: ResourceAddress) {
        tracing::debug!("Changed: {}", address);
        // No receivers is fine: nobody is watching
        let _ = self.sender.send(ChangeEvent { address });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}
