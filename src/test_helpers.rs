//! Recording fakes for the host-side traits.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::models::ImageItem;
use crate::slideshow::ActiveSink;
use crate::surface::{
    DisplayMode, GallerySurface, ImageDisplay, IndexSurface, ItemStyle, LayoutSurface,
};

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Place(usize),
    Clear(usize),
    Height(Option<f32>),
}

/// Grid whose items are named by their position ("0", "1", ...).
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub dimensions: Vec<(f32, f32)>,
    pub styles: HashMap<usize, ItemStyle>,
    pub container_height: Option<f32>,
    pub ops: Vec<Op>,
    pub hidden: Vec<usize>,
    pub revealed: Vec<usize>,
    pub captions: BTreeSet<usize>,
}

impl RecordingSurface {
    pub fn with_dimensions(width: f32, dimensions: &[(f32, f32)]) -> Self {
        Self {
            width,
            dimensions: dimensions.to_vec(),
            ..Default::default()
        }
    }

    pub fn all_hidden(mut self) -> Self {
        self.hidden = (0..self.dimensions.len()).collect();
        self
    }
}

impl LayoutSurface for RecordingSurface {
    fn container_width(&self) -> f32 {
        self.width
    }

    fn items(&self) -> Vec<ImageItem> {
        self.dimensions
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| ImageItem::new(i.to_string(), w, h))
            .collect()
    }

    fn place_item(&mut self, index: usize, style: &ItemStyle) {
        self.styles.insert(index, *style);
        self.ops.push(Op::Place(index));
    }

    fn clear_item(&mut self, index: usize) {
        self.styles.remove(&index);
        self.ops.push(Op::Clear(index));
    }

    fn set_container_height(&mut self, height_px: Option<f32>) {
        self.container_height = height_px;
        self.ops.push(Op::Height(height_px));
    }
}

impl GallerySurface for RecordingSurface {
    fn hidden_items(&self) -> Vec<usize> {
        self.hidden.clone()
    }

    fn reveal_item(&mut self, index: usize) {
        self.hidden.retain(|&i| i != index);
        self.revealed.push(index);
    }

    fn set_caption_visible(&mut self, index: usize, visible: bool) {
        Marks::set(&mut self.captions, index, visible);
    }
}

/// A [`RecordingSurface`] the test keeps a handle to after giving it away.
#[derive(Clone)]
pub struct SharedSurface(Rc<RefCell<RecordingSurface>>);

impl SharedSurface {
    pub fn new(surface: RecordingSurface) -> Self {
        Self(Rc::new(RefCell::new(surface)))
    }

    pub fn state(&self) -> Ref<'_, RecordingSurface> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, RecordingSurface> {
        self.0.borrow_mut()
    }

    pub fn set_width(&self, width: f32) {
        self.0.borrow_mut().width = width;
    }
}

impl LayoutSurface for SharedSurface {
    fn container_width(&self) -> f32 {
        self.0.borrow().container_width()
    }

    fn items(&self) -> Vec<ImageItem> {
        self.0.borrow().items()
    }

    fn place_item(&mut self, index: usize, style: &ItemStyle) {
        self.0.borrow_mut().place_item(index, style);
    }

    fn clear_item(&mut self, index: usize) {
        self.0.borrow_mut().clear_item(index);
    }

    fn set_container_height(&mut self, height_px: Option<f32>) {
        self.0.borrow_mut().set_container_height(height_px);
    }
}

impl GallerySurface for SharedSurface {
    fn hidden_items(&self) -> Vec<usize> {
        self.0.borrow().hidden_items()
    }

    fn reveal_item(&mut self, index: usize) {
        self.0.borrow_mut().reveal_item(index);
    }

    fn set_caption_visible(&mut self, index: usize, visible: bool) {
        self.0.borrow_mut().set_caption_visible(index, visible);
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    loads: RefCell<Vec<(String, DisplayMode)>>,
}

impl RecordingDisplay {
    pub fn loaded(&self) -> Vec<String> {
        self.loads.borrow().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn modes(&self) -> Vec<DisplayMode> {
        self.loads.borrow().iter().map(|(_, mode)| *mode).collect()
    }
}

impl ImageDisplay for RecordingDisplay {
    fn load(&self, correlation_id: &str, mode: DisplayMode) {
        self.loads.borrow_mut().push((correlation_id.to_string(), mode));
    }
}

#[derive(Debug, Default)]
struct Marks {
    items: BTreeSet<usize>,
    links: BTreeSet<usize>,
}

impl Marks {
    fn set(set: &mut BTreeSet<usize>, index: usize, active: bool) {
        if active {
            set.insert(index);
        } else {
            set.remove(&index);
        }
    }
}

/// Cloneable sink; every clone sees the same markings.
#[derive(Clone, Default)]
pub struct RecordingActiveSink {
    marks: Rc<RefCell<Marks>>,
}

impl RecordingActiveSink {
    pub fn active_items(&self) -> Vec<usize> {
        self.marks.borrow().items.iter().copied().collect()
    }

    pub fn active_links(&self) -> Vec<usize> {
        self.marks.borrow().links.iter().copied().collect()
    }

    /// Marks an item behind the coordinator's back.
    pub fn force_item(&self, index: usize) {
        self.marks.borrow_mut().items.insert(index);
    }

    pub fn force_link(&self, index: usize) {
        self.marks.borrow_mut().links.insert(index);
    }
}

impl ActiveSink for RecordingActiveSink {
    fn set_item_active(&mut self, index: usize, active: bool) {
        Marks::set(&mut self.marks.borrow_mut().items, index, active);
    }

    fn set_link_active(&mut self, index: usize, active: bool) {
        Marks::set(&mut self.marks.borrow_mut().links, index, active);
    }
}

#[derive(Debug, Default)]
pub struct RecordingIndexSurface {
    pub item_count: usize,
    pub link_count: usize,
    pub hide_desc: bool,
    pub animation_paused: bool,
    pub nav_hovered: bool,
    pub height: Option<f32>,
    pub has_touch: bool,
    marks: Marks,
}

impl RecordingIndexSurface {
    pub fn new(item_count: usize, link_count: usize) -> Self {
        Self {
            item_count,
            link_count,
            ..Default::default()
        }
    }

    pub fn active_items(&self) -> Vec<usize> {
        self.marks.items.iter().copied().collect()
    }

    pub fn active_links(&self) -> Vec<usize> {
        self.marks.links.iter().copied().collect()
    }

    pub fn force_item(&mut self, index: usize) {
        self.marks.items.insert(index);
    }
}

impl ActiveSink for RecordingIndexSurface {
    fn set_item_active(&mut self, index: usize, active: bool) {
        if index < self.item_count {
            Marks::set(&mut self.marks.items, index, active);
        }
    }

    fn set_link_active(&mut self, index: usize, active: bool) {
        if index < self.link_count {
            Marks::set(&mut self.marks.links, index, active);
        }
    }
}

impl IndexSurface for RecordingIndexSurface {
    fn set_hide_desc(&mut self, hidden: bool) {
        self.hide_desc = hidden;
    }

    fn set_animation_paused(&mut self, paused: bool) {
        self.animation_paused = paused;
    }

    fn set_nav_hovered(&mut self, hovered: bool) {
        self.nav_hovered = hovered;
    }

    fn set_height(&mut self, height_px: f32) {
        self.height = Some(height_px);
    }

    fn set_has_touch(&mut self, has_touch: bool) {
        self.has_touch = has_touch;
    }
}
