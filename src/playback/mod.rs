pub mod poller;
pub mod transport;

pub use poller::PlaybackPoller;
pub use transport::{OfflineTransport, PlaybackPrimitive};
