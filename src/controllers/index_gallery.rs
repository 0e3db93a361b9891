use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{IndexPage, SurfaceSink};
use crate::config::{tweaks, ConfigChange, ConfigStore, SubscriptionId};
use crate::error::{Error, Result};
use crate::schedule::Scheduler;
use crate::slideshow::{ActiveSetCoordinator, RotatorState, SlideRotator};
use crate::surface::IndexSurface;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSettings {
    pub slideshow_on: bool,
    pub slideshow_touch_on: bool,
    /// Zero when neither slideshow switch is on.
    pub delay: Duration,
    /// Whether the title card takes part in the rotation.
    pub show_title_card: bool,
    pub hide_desc_on_hover: bool,
}

impl IndexSettings {
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self> {
        let slideshow_on = tweaks::read_bool(store, tweaks::INDEX_SLIDESHOW_ON);
        let slideshow_touch_on = tweaks::read_bool(store, tweaks::INDEX_SLIDESHOW_TOUCH_ON);

        let delay = if slideshow_on || slideshow_touch_on {
            let seconds = tweaks::read_number(store, tweaks::INDEX_SLIDESHOW_DELAY)?;
            if seconds <= 0.0 {
                return Err(Error::InvalidTweak {
                    key: tweaks::INDEX_SLIDESHOW_DELAY.to_string(),
                    value: tweaks::read_string(store, tweaks::INDEX_SLIDESHOW_DELAY),
                });
            }
            Duration::from_secs_f32(seconds)
        } else {
            Duration::ZERO
        };

        Ok(Self {
            slideshow_on,
            slideshow_touch_on,
            delay,
            show_title_card: tweaks::read_bool(store, tweaks::INDEX_INACTIVE_ON_LOAD),
            hide_desc_on_hover: tweaks::read_bool(store, tweaks::HIDE_INDEX_DESC_ON_HOVER),
        })
    }

    pub fn slideshow_enabled(&self, has_touch: bool) -> bool {
        self.slideshow_on || (has_touch && self.slideshow_touch_on)
    }
}

struct Shared {
    store: Rc<dyn ConfigStore>,
    scheduler: Rc<dyn Scheduler>,
    surface: Rc<RefCell<dyn IndexSurface>>,
    page: IndexPage,
    has_touch: bool,
    rotator: RefCell<Option<SlideRotator>>,
    /// Entry position of each slide in the current rotation.
    slides: RefCell<Vec<usize>>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl Shared {
    fn sync(self: &Rc<Self>) -> Result<()> {
        self.surface.borrow_mut().set_hide_desc(false);
        self.stop_rotator();

        let settings = IndexSettings::from_store(self.store.as_ref())?;
        if !settings.slideshow_enabled(self.has_touch) {
            debug!("Index slideshow disabled");
            return Ok(());
        }

        let slides: Vec<usize> = self
            .page
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| settings.show_title_card || !e.is_title_card)
            .map(|(i, _)| i)
            .collect();
        let slide_ids = slides
            .iter()
            .map(|&i| self.page.entries[i].correlation_id.clone())
            .collect();

        let sink = SurfaceSink::new(Rc::clone(&self.surface), slides.clone());
        let active = ActiveSetCoordinator::new(slide_ids, self.page.links.clone())
            .with_sink(Box::new(sink));
        let rotator = SlideRotator::new(Rc::clone(&self.scheduler), settings.delay, active);

        let weak = Rc::downgrade(self);
        rotator.on_slide_changed(move |change| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let is_title_card = shared
                .slides
                .borrow()
                .get(change.index)
                .map(|&entry| shared.page.entries[entry].is_title_card)
                .unwrap_or(false);
            let hide = tweaks::read_bool(shared.store.as_ref(), tweaks::HIDE_INDEX_DESC_ON_HOVER);
            shared.surface.borrow_mut().set_hide_desc(hide && !is_title_card);
        });

        *self.slides.borrow_mut() = slides;
        self.surface.borrow_mut().set_animation_paused(false);
        rotator.start()?;
        *self.rotator.borrow_mut() = Some(rotator);
        Ok(())
    }

    fn stop_rotator(&self) {
        if let Some(rotator) = self.rotator.borrow_mut().take() {
            rotator.stop();
        }
        self.slides.borrow_mut().clear();
    }
}

/// Index list slideshow.
///
/// Rotates through the index images (the title card too, when the
/// inactive-on-load tweak is on), keeping the matching navigation link
/// active, and rebuilds itself whenever one of its tweaks changes.
pub struct IndexGallery {
    shared: Rc<Shared>,
}

impl IndexGallery {
    pub fn new(
        store: Rc<dyn ConfigStore>,
        scheduler: Rc<dyn Scheduler>,
        surface: Rc<RefCell<dyn IndexSurface>>,
        page: IndexPage,
        has_touch: bool,
    ) -> Result<Self> {
        let shared = Rc::new(Shared {
            store,
            scheduler,
            surface,
            page,
            has_touch,
            rotator: RefCell::new(None),
            slides: RefCell::new(Vec::new()),
            subscription: Cell::new(None),
        });
        shared.sync()?;

        let weak = Rc::downgrade(&shared);
        let id = shared.store.subscribe(
            tweaks::INDEX_GALLERY_WATCHED,
            Rc::new(move |change: &ConfigChange| {
                if let Some(shared) = weak.upgrade() {
                    debug!(key = %change.key, "Index gallery tweak changed");
                    if let Err(err) = shared.sync() {
                        warn!(error = %err, "Index slideshow rebuild failed");
                    }
                }
            }),
        );
        shared.subscription.set(Some(id));

        Ok(Self { shared })
    }

    pub fn state(&self) -> RotatorState {
        self.shared
            .rotator
            .borrow()
            .as_ref()
            .map(|r| r.state())
            .unwrap_or(RotatorState::Stopped)
    }

    /// Entry position of the current slide.
    pub fn current_entry(&self) -> Option<usize> {
        let rotator = self.shared.rotator.borrow();
        let index = rotator.as_ref()?.current_index();
        self.shared.slides.borrow().get(index).copied()
    }

    pub fn slide_count(&self) -> usize {
        self.shared.slides.borrow().len()
    }

    /// Pointer entered the navigation; `on_link` is true over a link label.
    pub fn handle_pointer_over(&self, on_link: bool) {
        if !on_link {
            return;
        }
        if let Some(rotator) = self.shared.rotator.borrow().as_ref() {
            rotator.handle_pointer_over(true);
            self.shared.surface.borrow_mut().set_animation_paused(true);
        }
    }

    pub fn handle_pointer_leave(&self) {
        if let Some(rotator) = self.shared.rotator.borrow().as_ref() {
            self.shared.surface.borrow_mut().set_animation_paused(false);
            rotator.handle_pointer_leave();
        }
    }

    pub fn destroy(&self) {
        if let Some(id) = self.shared.subscription.take() {
            self.shared.store.unsubscribe(id);
        }
        self.shared.stop_rotator();
    }
}

impl Drop for IndexGallery {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigStore;
    use crate::controllers::IndexEntry;
    use crate::schedule::ManualScheduler;
    use crate::test_helpers::RecordingIndexSurface;

    const DELAY: Duration = Duration::from_secs(2);

    struct Fixture {
        store: Rc<MemoryConfigStore>,
        clock: Rc<ManualScheduler>,
        surface: Rc<RefCell<RecordingIndexSurface>>,
    }

    fn fixture(show_title_card: bool) -> Fixture {
        Fixture {
            store: Rc::new(MemoryConfigStore::with_values([
                (tweaks::INDEX_SLIDESHOW_ON, "true"),
                (tweaks::INDEX_SLIDESHOW_DELAY, "2"),
                (tweaks::INDEX_INACTIVE_ON_LOAD, if show_title_card { "true" } else { "false" }),
                (tweaks::HIDE_INDEX_DESC_ON_HOVER, "true"),
            ])),
            clock: Rc::new(ManualScheduler::new()),
            surface: Rc::new(RefCell::new(RecordingIndexSurface::new(4, 3))),
        }
    }

    fn page() -> IndexPage {
        IndexPage {
            entries: vec![
                IndexEntry::title_card("main"),
                IndexEntry::new("a"),
                IndexEntry::new("b"),
                IndexEntry::new("c"),
            ],
            links: vec!["a".into(), "b".into(), "c".into()],
            active_page: None,
        }
    }

    fn build(f: &Fixture) -> Result<IndexGallery> {
        IndexGallery::new(f.store.clone(), f.clock.clone(), f.surface.clone(), page(), false)
    }

    #[test]
    fn test_settings_from_store() {
        let f = fixture(true);
        let settings = IndexSettings::from_store(f.store.as_ref()).unwrap();
        assert_eq!(settings.delay, DELAY);
        assert!(settings.show_title_card);
        assert!(settings.slideshow_enabled(false));

        let touch_only = MemoryConfigStore::with_values([
            (tweaks::INDEX_SLIDESHOW_TOUCH_ON, "true"),
            (tweaks::INDEX_SLIDESHOW_DELAY, "1.5"),
        ]);
        let settings = IndexSettings::from_store(&touch_only).unwrap();
        assert!(!settings.slideshow_enabled(false));
        assert!(settings.slideshow_enabled(true));
        assert_eq!(settings.delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_bad_delay_rejected() {
        let f = fixture(false);
        f.store.set(tweaks::INDEX_SLIDESHOW_DELAY, "0");
        assert!(build(&f).is_err());
        assert_eq!(f.store.subscriber_count(), 0);
    }

    #[test]
    fn test_rotation_skips_title_card() {
        let f = fixture(false);
        let gallery = build(&f).unwrap();
        assert_eq!(gallery.slide_count(), 3);
        assert_eq!(gallery.current_entry(), Some(1));
        assert_eq!(f.surface.borrow().active_items(), vec![1]);
        assert_eq!(f.surface.borrow().active_links(), vec![0]);
        assert!(f.surface.borrow().hide_desc);

        f.clock.advance(DELAY * 3);
        assert_eq!(gallery.current_entry(), Some(1));
        f.clock.advance(DELAY);
        assert_eq!(f.surface.borrow().active_items(), vec![2]);
        assert_eq!(f.surface.borrow().active_links(), vec![1]);
    }

    #[test]
    fn test_title_card_shows_description() {
        let f = fixture(true);
        let gallery = build(&f).unwrap();
        assert_eq!(gallery.current_entry(), Some(0));
        assert!(f.surface.borrow().active_links().is_empty());
        assert!(!f.surface.borrow().hide_desc);

        f.clock.advance(DELAY);
        assert_eq!(gallery.current_entry(), Some(1));
        assert!(f.surface.borrow().hide_desc);
    }

    #[test]
    fn test_hover_pauses_and_leave_restores() {
        let f = fixture(false);
        let gallery = build(&f).unwrap();

        gallery.handle_pointer_over(false);
        assert_eq!(gallery.state(), RotatorState::Running);

        f.clock.advance(Duration::from_secs(1));
        gallery.handle_pointer_over(true);
        assert_eq!(gallery.state(), RotatorState::Paused);
        assert!(f.surface.borrow().animation_paused);

        // Hovering another link moves the markings elsewhere.
        f.surface.borrow_mut().force_item(3);
        f.clock.advance(DELAY * 2);
        gallery.handle_pointer_leave();
        assert_eq!(gallery.state(), RotatorState::Running);
        assert!(!f.surface.borrow().animation_paused);
        assert_eq!(f.surface.borrow().active_items(), vec![1]);

        f.clock.advance(DELAY - Duration::from_millis(1));
        assert_eq!(gallery.current_entry(), Some(1));
        f.clock.advance(Duration::from_millis(1));
        assert_eq!(gallery.current_entry(), Some(2));
    }

    #[test]
    fn test_tweak_change_rebuilds_rotation() {
        let f = fixture(false);
        let gallery = build(&f).unwrap();
        f.clock.advance(DELAY);
        assert_eq!(gallery.current_entry(), Some(2));

        f.store.set(tweaks::INDEX_INACTIVE_ON_LOAD, "true");
        assert_eq!(gallery.slide_count(), 4);
        assert_eq!(gallery.current_entry(), Some(0));
        assert_eq!(f.clock.pending(), 1);

        f.store.set(tweaks::INDEX_SLIDESHOW_ON, "false");
        assert_eq!(gallery.state(), RotatorState::Stopped);
        assert_eq!(f.clock.pending(), 0);
        assert!(!f.surface.borrow().hide_desc);
    }

    #[test]
    fn test_destroy_stops_and_unsubscribes() {
        let f = fixture(false);
        let gallery = build(&f).unwrap();
        gallery.destroy();

        assert_eq!(f.clock.pending(), 0);
        assert_eq!(f.store.subscriber_count(), 0);
        f.store.set(tweaks::INDEX_SLIDESHOW_ON, "true");
        assert_eq!(gallery.state(), RotatorState::Stopped);
    }
}
