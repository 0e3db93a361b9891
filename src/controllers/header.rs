use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use super::TABLET_BREAKPOINT;
use crate::config::{tweaks, ConfigChange, ConfigStore, SubscriptionId};
use crate::error::Result;
use crate::schedule::{Debouncer, ReadyGate, Scheduler, Throttler, RESIZE_DEBOUNCE, SCROLL_THROTTLE};
use crate::ui_state::{HeaderOverflow, UiState};

/// Distance from the end of the page at which the header swaps colour.
pub const SWAP_COLOR_OFFSET: f32 = 40.0;

const TABLET_SPACING_MULTIPLIER: f32 = 1.5;

/// Rendered widths of the header parts, in px. Absent parts measure 0.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct HeaderWidths {
    pub header: f32,
    pub site_title: f32,
    pub site_tagline: f32,
    /// The menu icon, the narrowest form the navigation can take.
    pub icon: f32,
    pub nav: f32,
    pub social_right: f32,
    pub cart_icon: f32,
    pub account_icon: f32,
}

/// Measures the header in its current state.
pub trait HeaderMeasure {
    fn widths(&self) -> HeaderWidths;

    /// Shown once overflows are resolved, hidden while they are recomputed.
    fn set_visible(&mut self, visible: bool);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderSettings {
    pub social_icons: bool,
    pub cart_icon_on_right: bool,
    pub account_icon_on_right: bool,
    /// Spacing between header elements in viewport-width percent.
    pub element_spacing_vw: f32,
}

impl HeaderSettings {
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self> {
        Ok(Self {
            social_icons: tweaks::read_bool(store, tweaks::DISPLAY_SOCIAL_ICONS),
            cart_icon_on_right: icon_on_right(store, tweaks::CART_LINK_DISPLAY),
            account_icon_on_right: icon_on_right(store, tweaks::USER_ACCOUNT_LINK_POSITION),
            element_spacing_vw: tweaks::read_number(store, tweaks::HEADER_ELEMENT_SPACING)?,
        })
    }

    pub fn spacing_px(&self, viewport_width: f32) -> f32 {
        let multiplier = if viewport_width <= TABLET_BREAKPOINT {
            TABLET_SPACING_MULTIPLIER
        } else {
            1.0
        };
        self.element_spacing_vw * multiplier * viewport_width / 100.0
    }
}

fn icon_on_right(store: &dyn ConfigStore, key: &str) -> bool {
    tweaks::read_lower(store, key) == "icon on right"
}

/// Decides which header elements have to give way.
///
/// `nav_width` is the navigation at full width, measured before any
/// overflow class applied.
pub fn resolve_overflows(
    widths: &HeaderWidths,
    nav_width: f32,
    settings: &HeaderSettings,
    viewport_width: f32,
) -> HeaderOverflow {
    let spacing = settings.spacing_px(viewport_width);
    let branding = widths.site_title + widths.site_tagline;

    let mut available = widths.header - (widths.icon + spacing);
    if settings.social_icons {
        available -= widths.social_right + spacing;
    }
    if settings.cart_icon_on_right {
        available -= widths.cart_icon + spacing;
    }
    if settings.account_icon_on_right {
        available -= widths.account_icon + spacing;
    }

    HeaderOverflow {
        mobile_style_nav: branding + nav_width + spacing > available,
        hide_tagline: branding + spacing > available,
        move_social: widths.site_title > available,
    }
}

struct OverflowShared {
    store: Rc<dyn ConfigStore>,
    measure: RefCell<Box<dyn HeaderMeasure>>,
    ui: Rc<UiState>,
    viewport_width: Cell<f32>,
    /// Set by the first render, after fonts have loaded.
    nav_width: Cell<Option<f32>>,
    destroyed: Cell<bool>,
}

impl OverflowShared {
    fn render(&self) -> Result<()> {
        if self.destroyed.get() {
            return Ok(());
        }
        let nav = self.measure.borrow().widths().nav;
        self.nav_width.set(Some(nav));
        self.resolve()
    }

    fn resolve(&self) -> Result<()> {
        let Some(nav_width) = self.nav_width.get() else {
            return Ok(());
        };
        if self.destroyed.get() {
            return Ok(());
        }
        let settings = HeaderSettings::from_store(self.store.as_ref())?;
        let widths = self.measure.borrow().widths();
        let overflow = resolve_overflows(&widths, nav_width, &settings, self.viewport_width.get());
        debug!(?overflow, "Header overflow resolved");

        self.ui.apply_header_overflow(overflow);
        self.measure.borrow_mut().set_visible(true);
        Ok(())
    }
}

/// Keeps the header's overflow flags in [`UiState`] current.
pub struct HeaderOverflowController {
    shared: Rc<OverflowShared>,
    resize: RefCell<Option<Debouncer>>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl HeaderOverflowController {
    /// The first render waits for `fonts`, since text widths change once
    /// web fonts arrive.
    pub fn new(
        store: Rc<dyn ConfigStore>,
        scheduler: Rc<dyn Scheduler>,
        measure: Box<dyn HeaderMeasure>,
        ui: Rc<UiState>,
        fonts: &ReadyGate,
        viewport_width: f32,
    ) -> Self {
        let shared = Rc::new(OverflowShared {
            store,
            measure: RefCell::new(measure),
            ui,
            viewport_width: Cell::new(viewport_width),
            nav_width: Cell::new(None),
            destroyed: Cell::new(false),
        });

        let weak = Rc::downgrade(&shared);
        fonts.when_ready(move || {
            if let Some(shared) = weak.upgrade() {
                if let Err(err) = shared.render() {
                    warn!(error = %err, "Header render failed");
                }
            }
        });

        let weak = Rc::downgrade(&shared);
        let resize = Debouncer::new(scheduler, RESIZE_DEBOUNCE, move || {
            if let Some(shared) = weak.upgrade() {
                shared.measure.borrow_mut().set_visible(false);
                if let Err(err) = shared.resolve() {
                    warn!(error = %err, "Header overflow after resize failed");
                }
            }
        });

        let weak = Rc::downgrade(&shared);
        let id = shared.store.subscribe(
            tweaks::HEADER_WATCHED,
            Rc::new(move |change: &ConfigChange| {
                if let Some(shared) = weak.upgrade() {
                    debug!(key = %change.key, "Header tweak changed");
                    if let Err(err) = shared.resolve() {
                        warn!(error = %err, "Header overflow after tweak change failed");
                    }
                }
            }),
        );

        Self {
            shared,
            resize: RefCell::new(Some(resize)),
            subscription: Cell::new(Some(id)),
        }
    }

    /// Measures the navigation again and re-resolves.
    pub fn sync(&self) -> Result<()> {
        self.shared.render()
    }

    pub fn is_rendered(&self) -> bool {
        self.shared.nav_width.get().is_some()
    }

    pub fn handle_resize(&self, viewport_width: f32) {
        self.shared.viewport_width.set(viewport_width);
        if let Some(debouncer) = self.resize.borrow().as_ref() {
            debouncer.call();
        }
    }

    pub fn destroy(&self) {
        // Disarms the fonts callback, which the gate keeps until it opens.
        self.shared.destroyed.set(true);
        if let Some(debouncer) = self.resize.borrow_mut().take() {
            debouncer.cancel();
        }
        if let Some(id) = self.subscription.take() {
            self.shared.store.unsubscribe(id);
        }
        self.shared.measure.borrow_mut().set_visible(false);
    }
}

impl Drop for HeaderOverflowController {
    fn drop(&mut self) {
        self.destroy();
    }
}

struct ScrollShared {
    ui: Rc<UiState>,
    last_position: Cell<f32>,
    position: Cell<f32>,
    page_height: Cell<f32>,
}

impl ScrollShared {
    fn respond(&self) {
        let pos = self.position.get();
        let page_height = self.page_height.get();

        let hidden = if pos < self.last_position.get() || pos >= page_height || pos == 0.0 {
            false
        } else {
            pos > 0.0 || self.ui.header_hidden()
        };
        self.ui.set_header_hidden(hidden);
        self.ui.set_swap_header_color(pos >= page_height - SWAP_COLOR_OFFSET);
        self.last_position.set(pos);
    }
}

/// Hides the header while scrolling down the page and swaps its colour near
/// the end of the page.
pub struct HeaderScroll {
    shared: Rc<ScrollShared>,
    throttle: Throttler,
    resize: Debouncer,
}

impl HeaderScroll {
    pub fn new(scheduler: Rc<dyn Scheduler>, ui: Rc<UiState>, scroll_position: f32) -> Self {
        let shared = Rc::new(ScrollShared {
            ui,
            last_position: Cell::new(scroll_position),
            position: Cell::new(scroll_position),
            page_height: Cell::new(f32::INFINITY),
        });

        let weak = Rc::downgrade(&shared);
        let throttle = Throttler::new(Rc::clone(&scheduler), SCROLL_THROTTLE, move || {
            if let Some(shared) = weak.upgrade() {
                shared.respond();
            }
        });

        let weak = Rc::downgrade(&shared);
        let resize = Debouncer::new(scheduler, RESIZE_DEBOUNCE, move || {
            if let Some(shared) = weak.upgrade() {
                shared.last_position.set(shared.position.get());
            }
        });

        Self { shared, throttle, resize }
    }

    /// Scroll event at `position`, on a page `page_height` px tall.
    pub fn handle_scroll(&self, position: f32, page_height: f32) {
        self.shared.position.set(position);
        self.shared.page_height.set(page_height);
        self.throttle.call();
    }

    /// Unthrottled form of [`HeaderScroll::handle_scroll`].
    pub fn respond_to_scroll(&self, position: f32, page_height: f32) {
        self.shared.position.set(position);
        self.shared.page_height.set(page_height);
        self.shared.respond();
    }

    /// Resize can jump the scroll position; the next scroll compares against
    /// where the page settled.
    pub fn handle_resize(&self, position: f32) {
        self.shared.position.set(position);
        self.resize.call();
    }

    pub fn sync(&self, position: f32) {
        self.shared.position.set(position);
        self.shared.last_position.set(position);
    }

    pub fn destroy(&self) {
        self.throttle.cancel();
        self.resize.cancel();
        self.shared.ui.set_header_hidden(false);
        self.shared.ui.set_swap_header_color(false);
    }
}

/// Menu button handler.
pub fn toggle_nav(ui: &UiState) -> bool {
    let open = ui.toggle_nav();
    debug!(open, "Navigation toggled");
    open
}
