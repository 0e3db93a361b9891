pub mod store;
pub mod tweaks;

pub use store::{ConfigChange, ConfigHandler, ConfigStore, MemoryConfigStore, SubscriptionId};
