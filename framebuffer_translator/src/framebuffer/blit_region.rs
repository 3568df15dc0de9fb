/// Blit request parameters

use super::{Planes, Rect};

/// Sampling filter of a scaled blit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
}

/// Source and destination rectangles of a blit
///
/// Rectangles are corner pairs; a reversed axis on either side requests a
/// flip along that axis. Reversing both sides cancels out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitRegion {
    pub source: Rect,
    pub destination: Rect,
    pub scissor: Option<Rect>,
    pub filter: Filter,
    pub planes: Planes,
}

impl BlitRegion {
    /// Nearest-filtered blit of `planes` without scissor
    pub fn new(source: Rect, destination: Rect, planes: Planes) -> Self {
        Self { source, destination, scissor: None, filter: Filter::Nearest, planes }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_scissor(mut self, scissor: Rect) -> Self {
        self.scissor = Some(scissor);
        self
    }
}
