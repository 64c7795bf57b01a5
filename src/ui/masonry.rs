//! Masonry layout: translate measured tile heights into grid row spans.
//! The DOM layer re-runs `layout` on image load, container mutation and
//! debounced resize; the math here must therefore be idempotent.

/// Trailing-edge debounce applied to viewport resize events.
pub const RELAYOUT_DEBOUNCE_MS: u64 = 150;
/// Delay after mount before the first measurement pass, giving images a
/// chance to start loading.
pub const MOUNT_SETTLE_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasonryConfig {
    /// Height of one implicit grid row, in px.
    pub row_height: u32,
    /// Gap between rows, in px.
    pub row_gap: u32,
}

impl Default for MasonryConfig {
    fn default() -> Self {
        MasonryConfig {
            row_height: 10,
            row_gap: 16,
        }
    }
}

impl MasonryConfig {
    /// `ceil((height + gap) / (row_height + gap))`, never below 1.
    pub fn row_span(&self, content_height: u32) -> u32 {
        let unit = self.row_height + self.row_gap;
        if unit == 0 {
            return 1;
        }
        ((content_height + self.row_gap).div_ceil(unit)).max(1)
    }
}

#[derive(Debug, Default)]
pub struct MasonryGrid {
    config: MasonryConfig,
    spans: Vec<u32>,
}

impl MasonryGrid {
    pub fn new(config: MasonryConfig) -> Self {
        MasonryGrid {
            config,
            spans: Vec::new(),
        }
    }

    /// Recomputes every child's span from its measured content height.
    pub fn layout(&mut self, heights: &[u32]) -> &[u32] {
        self.spans.clear();
        self.spans
            .extend(heights.iter().map(|&h| self.config.row_span(h)));
        &self.spans
    }

    pub fn spans(&self) -> &[u32] {
        &self.spans
    }
}
