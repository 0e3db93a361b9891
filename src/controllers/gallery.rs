use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, warn};

use super::MOBILE_BREAKPOINT;
use crate::config::{tweaks, ConfigChange, ConfigStore, SubscriptionId};
use crate::error::Result;
use crate::layout::{Autorows, LayoutConfig};
use crate::schedule::{Debouncer, Scheduler, TimerId, RESIZE_DEBOUNCE};
use crate::surface::{DisplayMode, GallerySurface, ImageDisplay};

/// Columns per row in the horizontal gallery.
pub const GALLERY_COLUMNS: usize = 2;

/// Delay between revealing consecutive grid items after a layout.
pub const GRID_REVEAL_INTERVAL: Duration = Duration::from_millis(130);

/// How long a caption stays up after the pointer leaves its indicator.
pub const CAPTION_HIDE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryStyle {
    /// Single column, images at natural size.
    Stacked,
    /// Column packing handled by the host.
    Masonry,
    /// Justified rows.
    Horizontal,
}

impl GalleryStyle {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "horizontal" => Self::Horizontal,
            "masonry" => Self::Masonry,
            _ => Self::Stacked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GallerySettings {
    pub style: GalleryStyle,
    /// Gutter in viewport-width percent.
    pub gutter_vw: f32,
    pub full_width_landscape: bool,
}

impl GallerySettings {
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self> {
        let style = GalleryStyle::parse(&tweaks::read_string(store, tweaks::GALLERY_STYLE));
        let gutter_vw = match style {
            GalleryStyle::Horizontal => tweaks::read_number(store, tweaks::GALLERY_GUTTER)?,
            _ => tweaks::read_number(store, tweaks::GALLERY_GUTTER).unwrap_or(0.0),
        };
        Ok(Self {
            style,
            gutter_vw,
            full_width_landscape: tweaks::read_bool(store, tweaks::FULL_WIDTH_FIRST_LANDSCAPE),
        })
    }

    pub fn gutter_px(&self, viewport_width: f32) -> f32 {
        viewport_width * self.gutter_vw / 100.0
    }
}

/// Captions follow the pointer unless the captions tweak names another mode.
fn captions_on_hover(store: &dyn ConfigStore) -> bool {
    let mode = tweaks::read_lower(store, tweaks::SHOW_GALLERY_IMAGE_CAPTIONS);
    mode.is_empty() || mode == "on hover"
}

struct Shared {
    store: Rc<dyn ConfigStore>,
    scheduler: Rc<dyn Scheduler>,
    display: Rc<dyn ImageDisplay>,
    surface: RefCell<Box<dyn GallerySurface>>,
    grid: RefCell<Option<Autorows>>,
    viewport_width: Cell<f32>,
    pending_viewport_width: Cell<f32>,
    reveal_queue: RefCell<VecDeque<usize>>,
    reveal_timer: Cell<Option<TimerId>>,
    has_touch: bool,
    captions_on_hover: Cell<bool>,
    captions_shown: RefCell<BTreeSet<usize>>,
    caption_timer: Cell<Option<TimerId>>,
    subscription: Cell<Option<SubscriptionId>>,
    resize: RefCell<Option<Debouncer>>,
}

impl Shared {
    fn render(self: &Rc<Self>) -> Result<()> {
        self.teardown_grid();

        let settings = GallerySettings::from_store(self.store.as_ref())?;
        let viewport = self.viewport_width.get();

        if viewport <= MOBILE_BREAKPOINT {
            debug!(viewport, "Small viewport, stacking gallery");
            self.load_all();
            return Ok(());
        }

        match settings.style {
            GalleryStyle::Horizontal => {
                let config = LayoutConfig::new(
                    GALLERY_COLUMNS,
                    settings.gutter_px(viewport),
                    settings.full_width_landscape,
                )?;
                let mut grid = Autorows::new(config).with_auto_load(true);
                {
                    let mut surface = self.surface.borrow_mut();
                    grid.layout(&mut **surface, self.display.as_ref())?;
                }
                *self.grid.borrow_mut() = Some(grid);
                self.start_reveal();
            }
            GalleryStyle::Masonry | GalleryStyle::Stacked => {
                debug!(style = ?settings.style, "No row packing for gallery style");
                self.load_all();
            }
        }
        Ok(())
    }

    fn on_resize(self: &Rc<Self>) -> Result<()> {
        let viewport = self.pending_viewport_width.get();
        // Zooming on touch devices fires resize without a width change.
        if viewport == self.viewport_width.get() {
            return Ok(());
        }
        self.viewport_width.set(viewport);

        if viewport <= MOBILE_BREAKPOINT {
            self.teardown_grid();
            self.load_all();
            return Ok(());
        }

        let has_grid = self.grid.borrow().is_some();
        if !has_grid {
            return self.render();
        }

        let settings = GallerySettings::from_store(self.store.as_ref())?;
        {
            let mut grid_slot = self.grid.borrow_mut();
            if let Some(grid) = grid_slot.as_mut() {
                let config = grid.config().with_gutter(settings.gutter_px(viewport))?;
                grid.set_config(config);
                let mut surface = self.surface.borrow_mut();
                grid.layout(&mut **surface, self.display.as_ref())?;
            }
        }
        // Items still hidden from an interrupted reveal get a fresh one.
        self.start_reveal();
        Ok(())
    }

    fn load_all(&self) {
        let items = self.surface.borrow().items();
        for item in &items {
            self.display.load(&item.correlation_id, DisplayMode::Natural);
        }
    }

    fn start_reveal(self: &Rc<Self>) {
        self.cancel_reveal();
        let hidden: VecDeque<usize> = self.surface.borrow().hidden_items().into();
        if hidden.is_empty() {
            return;
        }
        *self.reveal_queue.borrow_mut() = hidden;

        let weak: Weak<Shared> = Rc::downgrade(self);
        let id = self.scheduler.set_interval(
            GRID_REVEAL_INTERVAL,
            Rc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.reveal_next();
                }
            }),
        );
        self.reveal_timer.set(Some(id));
    }

    fn reveal_next(&self) {
        let next = self.reveal_queue.borrow_mut().pop_front();
        match next {
            Some(index) => self.surface.borrow_mut().reveal_item(index),
            None => self.cancel_reveal(),
        }
    }

    fn cancel_reveal(&self) {
        if let Some(id) = self.reveal_timer.take() {
            self.scheduler.cancel(id);
        }
        self.reveal_queue.borrow_mut().clear();
    }

    fn on_tweak(self: &Rc<Self>, key: &str) -> Result<()> {
        if tweaks::GALLERY_RENDER_TWEAKS.iter().any(|k| *k == key) {
            self.render()?;
        }
        if key == tweaks::SHOW_GALLERY_IMAGE_CAPTIONS {
            self.hide_captions();
            self.captions_on_hover.set(captions_on_hover(self.store.as_ref()));
        }
        Ok(())
    }

    fn set_caption(&self, index: usize, visible: bool) {
        {
            let mut shown = self.captions_shown.borrow_mut();
            if visible {
                shown.insert(index);
            } else {
                shown.remove(&index);
            }
        }
        self.surface.borrow_mut().set_caption_visible(index, visible);
    }

    fn cancel_caption_timer(&self) {
        if let Some(id) = self.caption_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn show_caption(&self, index: usize) {
        self.cancel_caption_timer();
        let others: Vec<usize> = self
            .captions_shown
            .borrow()
            .iter()
            .copied()
            .filter(|&i| i != index)
            .collect();
        for other in others {
            self.set_caption(other, false);
        }
        self.set_caption(index, true);
    }

    fn schedule_caption_hide(self: &Rc<Self>, index: usize) {
        self.cancel_caption_timer();
        let weak: Weak<Shared> = Rc::downgrade(self);
        let id = self.scheduler.set_timeout(
            CAPTION_HIDE_DELAY,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.caption_timer.set(None);
                    shared.set_caption(index, false);
                }
            }),
        );
        self.caption_timer.set(Some(id));
    }

    fn hide_captions(&self) {
        self.cancel_caption_timer();
        let shown: Vec<usize> = self.captions_shown.borrow().iter().copied().collect();
        for index in shown {
            self.set_caption(index, false);
        }
    }

    fn teardown_grid(&self) {
        self.cancel_reveal();
        if let Some(mut grid) = self.grid.borrow_mut().take() {
            let mut surface = self.surface.borrow_mut();
            grid.reset(&mut **surface);
        }
    }
}

/// Gallery page controller.
///
/// Picks a presentation from the gallery tweaks, lays out horizontal
/// galleries in justified rows, and keeps the layout in step with viewport
/// and tweak changes until [`GalleryLayout::destroy`].
pub struct GalleryLayout {
    shared: Rc<Shared>,
}

impl GalleryLayout {
    pub fn new(
        store: Rc<dyn ConfigStore>,
        scheduler: Rc<dyn Scheduler>,
        display: Rc<dyn ImageDisplay>,
        surface: Box<dyn GallerySurface>,
        viewport_width: f32,
        has_touch: bool,
    ) -> Result<Self> {
        let on_hover = captions_on_hover(store.as_ref());
        let shared = Rc::new(Shared {
            store,
            scheduler: Rc::clone(&scheduler),
            display,
            surface: RefCell::new(surface),
            grid: RefCell::new(None),
            viewport_width: Cell::new(viewport_width),
            pending_viewport_width: Cell::new(viewport_width),
            reveal_queue: RefCell::new(VecDeque::new()),
            reveal_timer: Cell::new(None),
            has_touch,
            captions_on_hover: Cell::new(on_hover),
            captions_shown: RefCell::new(BTreeSet::new()),
            caption_timer: Cell::new(None),
            subscription: Cell::new(None),
            resize: RefCell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        *shared.resize.borrow_mut() = Some(Debouncer::new(scheduler, RESIZE_DEBOUNCE, move || {
            if let Some(shared) = weak.upgrade() {
                if let Err(err) = shared.on_resize() {
                    warn!(error = %err, "Gallery relayout after resize failed");
                }
            }
        }));

        let controller = Self { shared };
        controller.shared.render()?;

        let weak = Rc::downgrade(&controller.shared);
        let id = controller.shared.store.subscribe(
            tweaks::GALLERY_WATCHED,
            Rc::new(move |change: &ConfigChange| {
                if let Some(shared) = weak.upgrade() {
                    debug!(key = %change.key, "Gallery tweak changed");
                    if let Err(err) = shared.on_tweak(&change.key) {
                        warn!(error = %err, "Gallery update after tweak change failed");
                    }
                }
            }),
        );
        controller.shared.subscription.set(Some(id));

        Ok(controller)
    }

    /// Host resize event; the relayout runs once the burst settles.
    pub fn handle_resize(&self, viewport_width: f32) {
        self.shared.pending_viewport_width.set(viewport_width);
        if let Some(debouncer) = self.shared.resize.borrow().as_ref() {
            debouncer.call();
        }
    }

    /// Lays the gallery out again from the current tweaks.
    pub fn sync(&self) -> Result<()> {
        self.shared.render()
    }

    /// Pointer entered the caption indicator of `index`.
    pub fn handle_item_hover(&self, index: usize) {
        if self.shared.has_touch || !self.shared.captions_on_hover.get() {
            return;
        }
        self.shared.show_caption(index);
    }

    /// Pointer left the caption indicator; the caption lingers briefly.
    pub fn handle_item_leave(&self, index: usize) {
        if self.shared.has_touch || !self.shared.captions_on_hover.get() {
            return;
        }
        self.shared.schedule_caption_hide(index);
    }

    /// Touch devices toggle captions by tapping the indicator.
    pub fn handle_item_click(&self, index: usize) {
        if !self.shared.has_touch || !self.shared.captions_on_hover.get() {
            return;
        }
        let shown = self.shared.captions_shown.borrow().contains(&index);
        self.shared.set_caption(index, !shown);
    }

    pub fn caption_visible(&self, index: usize) -> bool {
        self.shared.captions_shown.borrow().contains(&index)
    }

    pub fn has_row_layout(&self) -> bool {
        self.shared.grid.borrow().is_some()
    }

    pub fn total_height(&self) -> Option<f32> {
        self.shared
            .grid
            .borrow()
            .as_ref()
            .and_then(|grid| grid.applied().map(|layout| layout.total_height_px))
    }

    pub fn viewport_width(&self) -> f32 {
        self.shared.viewport_width.get()
    }

    /// Cancels pending work, removes the layout and stops watching tweaks.
    /// Safe to call more than once.
    pub fn destroy(&self) {
        if let Some(debouncer) = self.shared.resize.borrow_mut().take() {
            debouncer.cancel();
        }
        if let Some(id) = self.shared.subscription.take() {
            self.shared.store.unsubscribe(id);
        }
        self.shared.cancel_caption_timer();
        self.shared.teardown_grid();
    }
}

impl Drop for GalleryLayout {
    fn drop(&mut self) {
        self.destroy();
    }
}
