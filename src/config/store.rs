use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

/// A configuration value changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub key: String,
    pub value: String,
}

pub type ConfigHandler = Rc<dyn Fn(&ConfigChange)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Live site configuration.
///
/// Values are strings, parsed by the reader. Every `subscribe` must be paired
/// with an `unsubscribe` from the owner's teardown.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Registers `handler` for changes to any of `keys`.
    fn subscribe(&self, keys: &[&str], handler: ConfigHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

struct Subscriber {
    id: SubscriptionId,
    keys: Vec<String>,
    handler: ConfigHandler,
}

/// In-process [`ConfigStore`].
#[derive(Default)]
pub struct MemoryConfigStore {
    values: RefCell<HashMap<String, String>>,
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store
            .values
            .borrow_mut()
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    /// Stores a value and notifies subscribers watching `key`.
    ///
    /// Handlers run after the store's own borrows are released, so they may
    /// read values or (un)subscribe.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        self.values.borrow_mut().insert(key.to_string(), value.clone());

        let handlers: Vec<ConfigHandler> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|sub| sub.keys.iter().any(|k| k == key))
            .map(|sub| Rc::clone(&sub.handler))
            .collect();

        trace!(key, handlers = handlers.len(), "config value changed");
        let change = ConfigChange {
            key: key.to_string(),
            value,
        };
        for handler in handlers {
            handler(&change);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn subscribe(&self, keys: &[&str], handler: ConfigHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            handler,
        });
        debug!(?id, keys = keys.len(), "config subscription added");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|sub| sub.id != id);
        debug!(?id, "config subscription removed");
    }
}
