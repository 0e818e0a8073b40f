use crate::pointer::{PointerHub, PointerPress, PointerSubscription, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Panel,
    Trigger,
    Outside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    Toggle,
    Open,
    /// Close requested by the host, e.g. on navigation or Escape.
    Close,
    Select { key: String },
    PointerDown { target: PointerTarget },
}

/// Open/closed state of one overflow panel.
///
/// While open the menu holds a pointer subscription so presses outside the
/// panel and trigger close it; closing releases the subscription.
#[derive(Debug)]
pub struct OverflowMenu {
    hub: PointerHub,
    subscription: Option<PointerSubscription>,
    trigger_region: Option<Region>,
    panel_region: Option<Region>,
}

impl OverflowMenu {
    pub fn new(hub: PointerHub) -> Self {
        Self {
            hub,
            subscription: None,
            trigger_region: None,
            panel_region: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.subscription.is_some()
    }

    /// Regions from the last frame, used to classify pointer presses.
    pub fn set_regions(&mut self, trigger: Option<Region>, panel: Option<Region>) {
        self.trigger_region = trigger;
        self.panel_region = panel;
    }

    #[cfg(test)]
    pub(crate) fn regions(&self) -> (Option<Region>, Option<Region>) {
        (self.trigger_region, self.panel_region)
    }

    /// Applies `event` and returns the key of a selected item, if any.
    pub fn apply(&mut self, event: MenuEvent) -> Option<String> {
        match event {
            MenuEvent::Toggle => {
                if self.is_open() {
                    self.close();
                } else {
                    self.open();
                }
                None
            }
            MenuEvent::Open => {
                self.open();
                None
            }
            MenuEvent::Close => {
                self.close();
                None
            }
            MenuEvent::Select { key } => {
                if !self.is_open() {
                    return None;
                }
                self.close();
                Some(key)
            }
            MenuEvent::PointerDown { target } => {
                if target == PointerTarget::Outside {
                    self.close();
                }
                None
            }
        }
    }

    /// Drains pending pointer presses. Returns whether the menu closed.
    pub fn poll_pointer(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };

        let presses = subscription.drain();
        for press in presses {
            let target = self.classify(press);
            self.apply(MenuEvent::PointerDown { target });
            if !self.is_open() {
                return true;
            }
        }
        false
    }

    fn classify(&self, press: PointerPress) -> PointerTarget {
        if self.panel_region.is_some_and(|region| region.contains(press)) {
            PointerTarget::Panel
        } else if self.trigger_region.is_some_and(|region| region.contains(press)) {
            PointerTarget::Trigger
        } else {
            PointerTarget::Outside
        }
    }

    fn open(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.hub.subscribe());
        }
    }

    fn close(&mut self) {
        self.subscription = None;
        self.panel_region = None;
    }
}
