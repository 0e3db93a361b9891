use std::cell::Cell;

/// Header overflow outcome, strongest last.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeaderOverflow {
    pub mobile_style_nav: bool,
    pub hide_tagline: bool,
    pub move_social: bool,
}

/// Page-wide presentation flags shared by the controllers that need them.
///
/// All writes go through the setters, which keep the flags consistent:
/// `move_social` implies `hide_tagline`, which implies `mobile_style_nav`.
#[derive(Debug, Default)]
pub struct UiState {
    mobile_style_nav: Cell<bool>,
    hide_tagline: Cell<bool>,
    move_social: Cell<bool>,
    nav_open: Cell<bool>,
    swap_header_color: Cell<bool>,
    header_hidden: Cell<bool>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mobile_style_nav(&self) -> bool {
        self.mobile_style_nav.get()
    }

    pub fn hide_tagline(&self) -> bool {
        self.hide_tagline.get()
    }

    pub fn move_social(&self) -> bool {
        self.move_social.get()
    }

    pub fn nav_open(&self) -> bool {
        self.nav_open.get()
    }

    pub fn swap_header_color(&self) -> bool {
        self.swap_header_color.get()
    }

    pub fn header_hidden(&self) -> bool {
        self.header_hidden.get()
    }

    pub fn set_mobile_style_nav(&self, on: bool) {
        self.mobile_style_nav.set(on);
        if !on {
            self.hide_tagline.set(false);
            self.move_social.set(false);
        }
    }

    pub fn set_hide_tagline(&self, on: bool) {
        self.hide_tagline.set(on);
        if on {
            self.mobile_style_nav.set(true);
        } else {
            self.move_social.set(false);
        }
    }

    pub fn set_move_social(&self, on: bool) {
        self.move_social.set(on);
        if on {
            self.set_hide_tagline(true);
        }
    }

    /// Replaces all three overflow flags at once.
    pub fn apply_header_overflow(&self, overflow: HeaderOverflow) {
        self.set_mobile_style_nav(false);
        self.set_mobile_style_nav(overflow.mobile_style_nav);
        self.set_hide_tagline(overflow.hide_tagline);
        self.set_move_social(overflow.move_social);
    }

    pub fn header_overflow(&self) -> HeaderOverflow {
        HeaderOverflow {
            mobile_style_nav: self.mobile_style_nav(),
            hide_tagline: self.hide_tagline(),
            move_social: self.move_social(),
        }
    }

    pub fn set_nav_open(&self, open: bool) {
        self.nav_open.set(open);
    }

    /// Returns the new state.
    pub fn toggle_nav(&self) -> bool {
        let open = !self.nav_open.get();
        self.nav_open.set(open);
        open
    }

    pub fn set_swap_header_color(&self, on: bool) {
        self.swap_header_color.set(on);
    }

    pub fn set_header_hidden(&self, hidden: bool) {
        self.header_hidden.set(hidden);
    }

    /// Class names the host should put on the page body.
    pub fn body_classes(&self) -> Vec<&'static str> {
        [
            (self.mobile_style_nav(), "mobile-style-nav"),
            (self.hide_tagline(), "hide-tagline"),
            (self.move_social(), "move-social"),
            (self.nav_open(), "nav-open"),
            (self.swap_header_color(), "swap-header-color"),
        ]
        .into_iter()
        .filter_map(|(on, class)| on.then_some(class))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_tagline_implies_mobile_nav() {
        let ui = UiState::new();
        ui.set_hide_tagline(true);
        assert!(ui.mobile_style_nav());

        ui.set_mobile_style_nav(false);
        assert!(!ui.hide_tagline());
    }

    #[test]
    fn test_move_social_implies_everything() {
        let ui = UiState::new();
        ui.set_move_social(true);
        assert_eq!(
            ui.header_overflow(),
            HeaderOverflow {
                mobile_style_nav: true,
                hide_tagline: true,
                move_social: true
            }
        );
        ui.set_hide_tagline(false);
        assert!(!ui.move_social());
        assert!(ui.mobile_style_nav());
    }

    #[test]
    fn test_apply_overflow_replaces_flags() {
        let ui = UiState::new();
        ui.apply_header_overflow(HeaderOverflow {
            mobile_style_nav: true,
            hide_tagline: true,
            move_social: false,
        });
        ui.apply_header_overflow(HeaderOverflow {
            mobile_style_nav: true,
            ..Default::default()
        });
        assert!(ui.mobile_style_nav());
        assert!(!ui.hide_tagline());
    }

    #[test]
    fn test_body_classes() {
        let ui = UiState::new();
        assert!(ui.body_classes().is_empty());
        ui.toggle_nav();
        ui.set_hide_tagline(true);
        assert_eq!(ui.body_classes(), vec!["mobile-style-nav", "hide-tagline", "nav-open"]);
        assert!(!ui.toggle_nav());
    }
}
