use tracing::trace;

/// Receives active-marking changes, e.g. to toggle an `active` class.
pub trait ActiveSink {
    fn set_item_active(&mut self, index: usize, active: bool);
    fn set_link_active(&mut self, index: usize, active: bool);
}

/// What ended up marked after an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub item: Option<usize>,
    pub link: Option<usize>,
}

/// Returns the first link whose correlation id equals `item_id`.
pub fn find_link_for(item_id: &str, links: &[String]) -> Option<usize> {
    links.iter().position(|link| link == item_id)
}

/// Keeps at most one item and one link active across two lists correlated
/// by id.
///
/// Every change first clears all markings, so a marking left behind by the
/// host (or a previous owner) never survives an activation.
pub struct ActiveSetCoordinator {
    items: Vec<String>,
    links: Vec<String>,
    active_item: Option<usize>,
    active_link: Option<usize>,
    sink: Option<Box<dyn ActiveSink>>,
}

impl ActiveSetCoordinator {
    /// `items` and `links` are the correlation ids of each list, in order.
    pub fn new(items: Vec<String>, links: Vec<String>) -> Self {
        Self {
            items,
            links,
            active_item: None,
            active_link: None,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn ActiveSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn active_item(&self) -> Option<usize> {
        self.active_item
    }

    pub fn active_link(&self) -> Option<usize> {
        self.active_link
    }

    pub fn is_item_active(&self, index: usize) -> bool {
        self.active_item == Some(index)
    }

    pub fn is_link_active(&self, index: usize) -> bool {
        self.active_link == Some(index)
    }

    pub fn link_for_item(&self, index: usize) -> Option<usize> {
        self.items
            .get(index)
            .and_then(|id| find_link_for(id, &self.links))
    }

    pub fn item_for_link(&self, index: usize) -> Option<usize> {
        let id = self.links.get(index)?;
        self.items.iter().position(|item| item == id)
    }

    /// Activates the item at `index` and its matching link, if any.
    /// An out-of-range index leaves everything cleared.
    pub fn activate(&mut self, index: usize) -> Activation {
        let item = (index < self.items.len()).then_some(index);
        let link = item.and_then(|i| self.link_for_item(i));
        self.mark(item, link)
    }

    /// Activates the link at `index` and the item it points to, if any.
    pub fn activate_link(&mut self, index: usize) -> Activation {
        let link = (index < self.links.len()).then_some(index);
        let item = link.and_then(|l| self.item_for_link(l));
        self.mark(item, link)
    }

    /// Clears everything, then marks exactly the given pair.
    pub fn mark(&mut self, item: Option<usize>, link: Option<usize>) -> Activation {
        self.clear();

        let item = item.filter(|i| *i < self.items.len());
        let link = link.filter(|l| *l < self.links.len());
        if let Some(sink) = self.sink.as_mut() {
            if let Some(i) = item {
                sink.set_item_active(i, true);
            }
            if let Some(l) = link {
                sink.set_link_active(l, true);
            }
        }
        self.active_item = item;
        self.active_link = link;
        trace!(?item, ?link, "active set changed");

        Activation { item, link }
    }

    pub fn clear(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            for i in 0..self.items.len() {
                sink.set_item_active(i, false);
            }
            for l in 0..self.links.len() {
                sink.set_link_active(l, false);
            }
        }
        self.active_item = None;
        self.active_link = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ids, RecordingActiveSink};

    fn coordinator() -> (ActiveSetCoordinator, RecordingActiveSink) {
        let sink = RecordingActiveSink::default();
        let coordinator = ActiveSetCoordinator::new(ids(&["a", "b", "c"]), ids(&["c", "a"]))
            .with_sink(Box::new(sink.clone()));
        (coordinator, sink)
    }

    #[test]
    fn test_find_link_for() {
        let links = ids(&["x", "y", "y"]);
        assert_eq!(find_link_for("y", &links), Some(1));
        assert_eq!(find_link_for("z", &links), None);
    }

    #[test]
    fn test_activate_replaces_previous() {
        let (mut set, sink) = coordinator();

        assert_eq!(set.activate(0), Activation { item: Some(0), link: Some(1) });
        assert_eq!(set.activate(2), Activation { item: Some(2), link: Some(0) });

        assert!(!set.is_item_active(0));
        assert!(set.is_item_active(2));
        assert_eq!(sink.active_items(), vec![2]);
        assert_eq!(sink.active_links(), vec![0]);
    }

    #[test]
    fn test_item_without_link() {
        let (mut set, sink) = coordinator();
        set.activate(0);
        let activation = set.activate(1);
        assert_eq!(activation, Activation { item: Some(1), link: None });
        assert!(sink.active_links().is_empty());
    }

    #[test]
    fn test_clears_stale_host_markings() {
        let (mut set, sink) = coordinator();
        sink.force_item(0);
        sink.force_link(1);
        set.activate(1);
        assert_eq!(sink.active_items(), vec![1]);
        assert!(sink.active_links().is_empty());
    }

    #[test]
    fn test_out_of_range_clears() {
        let (mut set, sink) = coordinator();
        set.activate(0);
        assert_eq!(set.activate(9), Activation { item: None, link: None });
        assert!(sink.active_items().is_empty());
        assert_eq!(set.active_item(), None);
    }

    #[test]
    fn test_activate_link() {
        let (mut set, _) = coordinator();
        assert_eq!(set.activate_link(0), Activation { item: Some(2), link: Some(0) });
        set.clear();
        assert_eq!(set.active_link(), None);
        assert_eq!(set.active_item(), None);
    }
}
