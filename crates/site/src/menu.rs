/// Open/closed state of the mobile navigation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Inputs that can move the menu between states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuEvent {
    /// Hamburger trigger activated.
    Toggle,
    LinkSelected,
    /// Pointer event that landed outside both trigger and panel.
    OutsidePointer,
    Escape,
    Resized { viewport_width: f64 },
    /// Programmatic open/close from the page API.
    Open,
    Close,
}

/// Mobile menu controller.
///
/// Body scroll lock is derived from the state, so it holds if and only if
/// the menu is open.
#[derive(Debug, Clone)]
pub struct MobileMenu {
    state: MenuState,
    breakpoint: f64,
    stopped: bool,
}

impl MobileMenu {
    pub fn new(breakpoint: f64) -> Self {
        Self {
            state: MenuState::Closed,
            breakpoint,
            stopped: false,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn scroll_locked(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Closes the menu for good. Later events are ignored, so a resize
    /// timer still in flight cannot reopen or re-lock the page.
    pub fn stop(&mut self) -> Option<MenuState> {
        let change = self.apply(MenuEvent::Close);
        self.stopped = true;
        change
    }

    /// Applies one event and returns the new state when it changed.
    pub fn apply(&mut self, event: MenuEvent) -> Option<MenuState> {
        if self.stopped {
            return None;
        }
        let next = self.next_state(event);
        if next == self.state {
            return None;
        }

        tracing::debug!(?event, from = ?self.state, to = ?next, "mobile menu transition");
        self.state = next;
        Some(next)
    }

    fn next_state(&self, event: MenuEvent) -> MenuState {
        match (self.state, event) {
            (MenuState::Closed, MenuEvent::Toggle | MenuEvent::Open) => MenuState::Open,
            (MenuState::Open, MenuEvent::Toggle)
            | (MenuState::Open, MenuEvent::LinkSelected)
            | (MenuState::Open, MenuEvent::OutsidePointer)
            | (MenuState::Open, MenuEvent::Escape)
            | (MenuState::Open, MenuEvent::Close) => MenuState::Closed,
            (MenuState::Open, MenuEvent::Resized { viewport_width })
                if viewport_width > self.breakpoint =>
            {
                MenuState::Closed
            }
            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(events: &[MenuEvent]) -> MobileMenu {
        let mut menu = MobileMenu::new(768.0);
        for event in events {
            menu.apply(*event);
        }
        menu
    }

    #[test]
    fn toggle_opens_and_locks_scroll() {
        let mut menu = MobileMenu::new(768.0);
        assert_eq!(menu.apply(MenuEvent::Toggle), Some(MenuState::Open));
        assert!(menu.scroll_locked());
        assert_eq!(menu.apply(MenuEvent::Toggle), Some(MenuState::Closed));
        assert!(!menu.scroll_locked());
    }

    #[test]
    fn outside_click_and_escape_close() {
        let menu = run(&[MenuEvent::Toggle, MenuEvent::OutsidePointer]);
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!menu.scroll_locked());

        let menu = run(&[MenuEvent::Toggle, MenuEvent::Escape]);
        assert_eq!(menu.state(), MenuState::Closed);

        let menu = run(&[MenuEvent::Open, MenuEvent::LinkSelected]);
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn closing_events_are_ignored_while_closed() {
        let mut menu = MobileMenu::new(768.0);
        for event in [
            MenuEvent::Escape,
            MenuEvent::OutsidePointer,
            MenuEvent::LinkSelected,
            MenuEvent::Close,
            MenuEvent::Resized { viewport_width: 1200.0 },
        ] {
            assert_eq!(menu.apply(event), None);
        }
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn resize_closes_only_past_breakpoint() {
        let mut menu = run(&[MenuEvent::Toggle]);
        assert_eq!(menu.apply(MenuEvent::Resized { viewport_width: 700.0 }), None);
        assert!(menu.is_open());
        assert_eq!(
            menu.apply(MenuEvent::Resized { viewport_width: 1024.0 }),
            Some(MenuState::Closed)
        );
    }

    #[test]
    fn scroll_lock_tracks_state_over_any_sequence() {
        let events = [
            MenuEvent::Toggle,
            MenuEvent::Open,
            MenuEvent::Escape,
            MenuEvent::Escape,
            MenuEvent::Open,
            MenuEvent::Resized { viewport_width: 320.0 },
            MenuEvent::LinkSelected,
            MenuEvent::Toggle,
            MenuEvent::Close,
        ];
        let mut menu = MobileMenu::new(768.0);
        for event in events {
            menu.apply(event);
            assert_eq!(menu.scroll_locked(), menu.is_open());
        }
    }

    #[test]
    fn stop_releases_scroll_lock_and_ignores_later_events() {
        let mut menu = run(&[MenuEvent::Toggle]);
        assert!(menu.scroll_locked());

        assert_eq!(menu.stop(), Some(MenuState::Closed));
        assert!(menu.is_stopped());
        assert!(!menu.scroll_locked());

        assert_eq!(menu.apply(MenuEvent::Toggle), None);
        assert_eq!(menu.apply(MenuEvent::Open), None);
        assert!(!menu.scroll_locked());
        assert_eq!(menu.stop(), None);
    }
}
