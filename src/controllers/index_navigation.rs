use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace};

use super::{IndexPage, SurfaceSink};
use crate::config::{tweaks, ConfigChange, ConfigStore, SubscriptionId};
use crate::error::{Error, Result};
use crate::schedule::{Debouncer, Scheduler, RESIZE_DEBOUNCE};
use crate::slideshow::{Activation, ActiveSetCoordinator};
use crate::surface::{DisplayMode, ImageDisplay, IndexSurface};

/// Where the index is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexView {
    /// The index list page itself.
    List,
    /// The index navigation block at the bottom of an item page.
    ItemNavigation,
}

/// The browser window the index is shown in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexViewport {
    pub height: f32,
    pub has_touch: bool,
}

struct Shared {
    store: Rc<dyn ConfigStore>,
    display: Rc<dyn ImageDisplay>,
    surface: Rc<RefCell<dyn IndexSurface>>,
    page: IndexPage,
    view: IndexView,
    active: RefCell<ActiveSetCoordinator>,
    hide_desc_on_hover: Cell<bool>,
    slideshow_active: Cell<bool>,
    viewport_height: Cell<f32>,
    subscription: Cell<Option<SubscriptionId>>,
    resize: RefCell<Option<Debouncer>>,
}

impl Shared {
    fn read_tweaks(&self) {
        self.hide_desc_on_hover
            .set(tweaks::read_bool(self.store.as_ref(), tweaks::HIDE_INDEX_DESC_ON_HOVER));
        self.slideshow_active
            .set(tweaks::read_bool(self.store.as_ref(), tweaks::INDEX_SLIDESHOW_ON));
    }

    fn show_title_card(&self) -> bool {
        self.view == IndexView::List
            && tweaks::read_bool(self.store.as_ref(), tweaks::INDEX_INACTIVE_ON_LOAD)
    }

    /// Title card if it is shown, otherwise the first item and its link.
    fn mark_default(&self) -> Activation {
        let mut active = self.active.borrow_mut();
        if self.show_title_card() {
            let title = self.page.title_card().unwrap_or(0);
            return active.mark(Some(title), None);
        }
        match self.page.first_item() {
            Some(item) => active.activate(item),
            None => active.mark(None, None),
        }
    }

    fn mark_initial(&self) -> Activation {
        match self.page.initially_active() {
            Some((entry, link)) => self.active.borrow_mut().mark(entry, Some(link)),
            None => self.mark_default(),
        }
    }

    fn fit_viewport(&self) {
        self.surface.borrow_mut().set_height(self.viewport_height.get());
    }

    fn load_images(&self) {
        for entry in &self.page.entries {
            self.display.load(&entry.correlation_id, DisplayMode::Fill);
        }
    }

    fn on_tweak_change(&self) {
        self.read_tweaks();
        self.mark_default();
    }
}

/// Hover behaviour of the index navigation.
///
/// Hovering a link shows its image; leaving the navigation reverts to the
/// page's resting state unless a slideshow owns the markings.
pub struct IndexNavigation {
    shared: Rc<Shared>,
}

impl IndexNavigation {
    pub fn new(
        store: Rc<dyn ConfigStore>,
        scheduler: Rc<dyn Scheduler>,
        display: Rc<dyn ImageDisplay>,
        surface: Rc<RefCell<dyn IndexSurface>>,
        page: IndexPage,
        view: IndexView,
        viewport: IndexViewport,
    ) -> Result<Self> {
        if page.links.is_empty() {
            return Err(Error::MissingElement("collection navigation"));
        }

        let sink = SurfaceSink::identity(Rc::clone(&surface), page.entries.len());
        let active = ActiveSetCoordinator::new(page.entry_ids(), page.links.clone())
            .with_sink(Box::new(sink));

        let shared = Rc::new(Shared {
            store,
            display,
            surface,
            page,
            view,
            active: RefCell::new(active),
            hide_desc_on_hover: Cell::new(false),
            slideshow_active: Cell::new(false),
            viewport_height: Cell::new(viewport.height),
            subscription: Cell::new(None),
            resize: RefCell::new(None),
        });
        shared.read_tweaks();

        let weak = Rc::downgrade(&shared);
        *shared.resize.borrow_mut() = Some(Debouncer::new(scheduler, RESIZE_DEBOUNCE, move || {
            if let Some(shared) = weak.upgrade() {
                shared.fit_viewport();
                shared.load_images();
            }
        }));

        let weak = Rc::downgrade(&shared);
        let id = shared.store.subscribe(
            tweaks::INDEX_NAVIGATION_WATCHED,
            Rc::new(move |change: &ConfigChange| {
                if let Some(shared) = weak.upgrade() {
                    debug!(key = %change.key, "Index navigation tweak changed");
                    shared.on_tweak_change();
                }
            }),
        );
        shared.subscription.set(Some(id));

        if viewport.has_touch {
            shared.surface.borrow_mut().set_has_touch(true);
        }
        shared.fit_viewport();
        shared.load_images();
        match shared.view {
            IndexView::ItemNavigation => shared.mark_initial(),
            IndexView::List => shared.mark_default(),
        };

        Ok(Self { shared })
    }

    /// Pointer moved onto the label of link `link`.
    pub fn handle_link_hover(&self, link: usize) -> Activation {
        let activation = self.shared.active.borrow_mut().activate_link(link);
        trace!(?activation, "Index link hovered");

        let mut surface = self.shared.surface.borrow_mut();
        surface.set_nav_hovered(true);
        if self.shared.hide_desc_on_hover.get() {
            surface.set_hide_desc(true);
        }
        activation
    }

    /// Pointer left the navigation.
    pub fn handle_leave(&self) -> Activation {
        let shared = &self.shared;
        let owned_by_slideshow = shared.slideshow_active.get() && shared.view == IndexView::List;
        let activation = if !owned_by_slideshow {
            shared.mark_initial()
        } else {
            // The slideshow re-marks its own slide when it resumes.
            let mut active = shared.active.borrow_mut();
            active.clear();
            Activation { item: None, link: None }
        };

        let mut surface = shared.surface.borrow_mut();
        surface.set_nav_hovered(false);
        if !shared.slideshow_active.get() {
            surface.set_hide_desc(false);
        }
        activation
    }

    /// Host resize event. Once the burst settles the index is fitted to
    /// the new viewport height and its images are reloaded.
    pub fn handle_resize(&self, viewport_height: f32) {
        self.shared.viewport_height.set(viewport_height);
        if let Some(debouncer) = self.shared.resize.borrow().as_ref() {
            debouncer.call();
        }
    }

    pub fn active_entry(&self) -> Option<usize> {
        self.shared.active.borrow().active_item()
    }

    pub fn active_link(&self) -> Option<usize> {
        self.shared.active.borrow().active_link()
    }

    pub fn destroy(&self) {
        if let Some(debouncer) = self.shared.resize.borrow_mut().take() {
            debouncer.cancel();
        }
        if let Some(id) = self.shared.subscription.take() {
            self.shared.store.unsubscribe(id);
        }
    }
}

impl Drop for IndexNavigation {
    fn drop(&mut self) {
        self.destroy();
    }
}
