//! Page controllers: each binds the core engines to a host surface, reads
//! its tweaks from a [`ConfigStore`](crate::config::ConfigStore) and tears
//! everything down again in `destroy`.

pub mod gallery;
pub mod header;
pub mod index_gallery;
pub mod index_navigation;

use std::cell::RefCell;
use std::rc::Rc;

pub use gallery::{GalleryLayout, GallerySettings, GalleryStyle};
pub use header::{
    resolve_overflows, toggle_nav, HeaderMeasure, HeaderOverflowController, HeaderScroll,
    HeaderSettings, HeaderWidths,
};
pub use index_gallery::{IndexGallery, IndexSettings};
pub use index_navigation::{IndexNavigation, IndexView, IndexViewport};

use crate::slideshow::ActiveSink;
use crate::surface::IndexSurface;

/// Viewports at or below this width get the stacked, single-column layouts.
pub const MOBILE_BREAKPOINT: f32 = 640.0;

/// Viewports at or below this width use wider header spacing.
pub const TABLET_BREAKPOINT: f32 = 1024.0;

/// One image container on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub correlation_id: String,
    /// The collection's own main image, shown before any item is hovered.
    pub is_title_card: bool,
}

impl IndexEntry {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            is_title_card: false,
        }
    }

    pub fn title_card(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            is_title_card: true,
        }
    }
}

/// Snapshot of an index page: its images, its navigation links and the page
/// the visitor is currently on, if it is part of the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPage {
    pub entries: Vec<IndexEntry>,
    /// Correlation ids of the navigation links, in order.
    pub links: Vec<String>,
    pub active_page: Option<String>,
}

impl IndexPage {
    pub fn entry_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.correlation_id.clone()).collect()
    }

    pub fn title_card(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.is_title_card)
    }

    pub fn first_item(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.is_title_card)
    }

    /// Entry and link of the page the visitor is on.
    pub fn initially_active(&self) -> Option<(Option<usize>, usize)> {
        let id = self.active_page.as_deref()?;
        let link = self.links.iter().position(|l| l == id)?;
        let entry = self.entries.iter().position(|e| e.correlation_id == id);
        Some((entry, link))
    }
}

/// Forwards active markings to an [`IndexSurface`] shared between
/// controllers, translating item positions into entry positions.
pub(crate) struct SurfaceSink {
    surface: Rc<RefCell<dyn IndexSurface>>,
    entries: Vec<usize>,
}

impl SurfaceSink {
    pub(crate) fn new(surface: Rc<RefCell<dyn IndexSurface>>, entries: Vec<usize>) -> Self {
        Self { surface, entries }
    }

    pub(crate) fn identity(surface: Rc<RefCell<dyn IndexSurface>>, len: usize) -> Self {
        Self::new(surface, (0..len).collect())
    }
}

impl ActiveSink for SurfaceSink {
    fn set_item_active(&mut self, index: usize, active: bool) {
        if let Some(&entry) = self.entries.get(index) {
            self.surface.borrow_mut().set_item_active(entry, active);
        }
    }

    fn set_link_active(&mut self, index: usize, active: bool) {
        self.surface.borrow_mut().set_link_active(index, active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingIndexSurface;

    fn page() -> IndexPage {
        IndexPage {
            entries: vec![
                IndexEntry::title_card("main"),
                IndexEntry::new("a"),
                IndexEntry::new("b"),
            ],
            links: vec!["a".into(), "b".into()],
            active_page: Some("b".into()),
        }
    }

    #[test]
    fn test_page_lookups() {
        let page = page();
        assert_eq!(page.title_card(), Some(0));
        assert_eq!(page.first_item(), Some(1));
        assert_eq!(page.initially_active(), Some((Some(2), 1)));

        let elsewhere = IndexPage {
            active_page: Some("zzz".into()),
            ..page
        };
        assert_eq!(elsewhere.initially_active(), None);
    }

    #[test]
    fn test_sink_maps_positions() {
        let surface = Rc::new(RefCell::new(RecordingIndexSurface::new(3, 2)));
        let mut sink = SurfaceSink::new(surface.clone(), vec![1, 2]);
        sink.set_item_active(0, true);
        sink.set_item_active(5, true);
        sink.set_link_active(1, true);

        let surface = surface.borrow();
        assert_eq!(surface.active_items(), vec![1]);
        assert_eq!(surface.active_links(), vec![1]);
    }
}
