//! Modal gallery: a focused, navigable detail view over the items
//! currently rendered on the page. One instance per page, rebuilt when
//! the grid re-renders.

/// Two wheel ticks closer together than this are one gesture.
pub const WHEEL_THROTTLE_MS: u64 = 400;
/// Minimum horizontal travel before a touch counts as a swipe.
pub const SWIPE_MIN_DISTANCE: f64 = 50.0;
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub pin_id: String,
    pub image_url: String,
    pub title: String,
    pub owner_username: String,
}

/// Result of a successful navigation: which item to render into the
/// detail panel, and which image to opportunistically preload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub item: GalleryItem,
    pub preload: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickZone {
    Previous,
    Middle,
    Next,
}

/// Left third navigates back, right third forward, the middle does
/// nothing (it is the zoom/rotate surface).
pub fn click_zone(x: f64, width: f64) -> ClickZone {
    if width <= 0.0 {
        return ClickZone::Middle;
    }
    if x < width / 3.0 {
        ClickZone::Previous
    } else if x > width * 2.0 / 3.0 {
        ClickZone::Next
    } else {
        ClickZone::Middle
    }
}

#[derive(Debug)]
pub struct Gallery {
    items: Vec<GalleryItem>,
    index: usize,
    open: bool,
    rotation: u16,
    zoom: f32,
    last_wheel_ms: Option<u64>,
}

impl Gallery {
    pub fn new(items: Vec<GalleryItem>) -> Self {
        Gallery {
            items,
            index: 0,
            open: false,
            rotation: 0,
            zoom: ZOOM_MIN,
            last_wheel_ms: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn navigation(&self, direction: isize) -> Navigation {
        let preload_index = self.index as isize + direction;
        Navigation {
            item: self.items[self.index].clone(),
            preload: usize::try_from(preload_index)
                .ok()
                .and_then(|i| self.items.get(i))
                .map(|item| item.image_url.clone()),
        }
    }

    /// Opens the modal on the given item; out-of-range indexes clamp into
    /// bounds. Returns `None` only when there is nothing to show.
    pub fn open(&mut self, index: usize) -> Option<Navigation> {
        if self.items.is_empty() {
            return None;
        }
        self.index = index.min(self.items.len() - 1);
        self.open = true;
        self.rotation = 0;
        self.zoom = ZOOM_MIN;
        Some(Navigation {
            item: self.items[self.index].clone(),
            preload: None,
        })
    }

    pub fn close(&mut self) {
        self.open = false;
        self.rotation = 0;
        self.zoom = ZOOM_MIN;
    }

    /// Advances by one. A no-op at the last index: the index stays put and
    /// no repopulation happens.
    pub fn next(&mut self) -> Option<Navigation> {
        if !self.open || self.index + 1 >= self.items.len() {
            return None;
        }
        self.index += 1;
        self.rotation = 0;
        Some(self.navigation(1))
    }

    /// Steps back by one; no-op at index zero.
    pub fn previous(&mut self) -> Option<Navigation> {
        if !self.open || self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.rotation = 0;
        Some(self.navigation(-1))
    }

    pub fn rotate(&mut self) {
        self.rotation = (self.rotation + 90) % 360;
    }

    pub fn on_key(&mut self, key: Key) -> Option<Navigation> {
        if !self.open {
            return None;
        }
        match key {
            Key::ArrowLeft => self.previous(),
            Key::ArrowRight => self.next(),
            Key::Escape => {
                self.close();
                None
            }
        }
    }

    /// One navigation per wheel gesture: ticks inside the throttle window
    /// are dropped wholesale.
    pub fn on_wheel(&mut self, delta_y: f64, now_ms: u64) -> Option<Navigation> {
        if !self.open || delta_y == 0.0 {
            return None;
        }
        if let Some(last) = self.last_wheel_ms {
            if now_ms.saturating_sub(last) < WHEEL_THROTTLE_MS {
                return None;
            }
        }
        self.last_wheel_ms = Some(now_ms);
        if delta_y > 0.0 {
            self.next()
        } else {
            self.previous()
        }
    }

    /// Horizontal swipe. Requires the minimum travel distance and a
    /// dominant horizontal axis so vertical page scrolling never pages
    /// the gallery.
    pub fn on_swipe(&mut self, dx: f64, dy: f64) -> Option<Navigation> {
        if !self.open || dx.abs() < SWIPE_MIN_DISTANCE || dx.abs() <= dy.abs() {
            return None;
        }
        if dx < 0.0 {
            self.next()
        } else {
            self.previous()
        }
    }

    pub fn on_click(&mut self, x: f64, width: f64) -> Option<Navigation> {
        if !self.open {
            return None;
        }
        match click_zone(x, width) {
            ClickZone::Previous => self.previous(),
            ClickZone::Next => self.next(),
            ClickZone::Middle => None,
        }
    }

    /// Two-finger distance ratio maps straight onto the zoom scale.
    pub fn on_pinch(&mut self, start_distance: f64, current_distance: f64) {
        if !self.open || start_distance <= 0.0 {
            return;
        }
        let ratio = (current_distance / start_distance) as f32;
        self.zoom = ratio.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn end_pinch(&mut self) {
        self.zoom = ZOOM_MIN;
    }
}
