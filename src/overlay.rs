//! Floating overlay surfaces owned by a page agent.
//!
//! Each page has at most one surface of each kind. A surface is created the
//! first time it is needed and lives until the page goes away; hiding it
//! only flips `visible`.

use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::dom::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceKind {
    /// Floating editor that mirrors a page field
    Surrogate,
    /// Assistant panel for the text-generation service
    Assistant,
}

/// Corner handle used for resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySurface {
    kind: SurfaceKind,
    visible: bool,
    position: Point,
    size: Size,
    min_size: Size,
    /// Page element this surface mirrors. A weak handle: the element may
    /// already be gone.
    bound_element: Option<ElementId>,
    /// Editor contents
    text: String,
}

impl OverlaySurface {
    pub fn new(kind: SurfaceKind, geometry: &OverlayConfig) -> Self {
        Self {
            kind,
            visible: false,
            position: Point {
                x: geometry.x,
                y: geometry.y,
            },
            size: Size {
                width: geometry.width.max(geometry.min_width),
                height: geometry.height.max(geometry.min_height),
            },
            min_size: Size {
                width: geometry.min_width,
                height: geometry.min_height,
            },
            bound_element: None,
            text: String::new(),
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bound_element(&self) -> Option<ElementId> {
        self.bound_element
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Show, bound to `element`, pre-filled with `text`
    pub fn show_bound(&mut self, element: ElementId, text: impl Into<String>) {
        self.bound_element = Some(element);
        self.text = text.into();
        self.visible = true;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hide and forget the bound element
    pub fn hide(&mut self) {
        self.visible = false;
        self.bound_element = None;
    }

    pub fn drag_by(&mut self, dx: f32, dy: f32) {
        self.position.x += dx;
        self.position.y += dy;
    }

    /// Resize from a corner; the opposite corner stays put and the size
    /// never drops below the minimum.
    pub fn resize_from(&mut self, handle: ResizeHandle, dx: f32, dy: f32) {
        let right = self.position.x + self.size.width;
        let bottom = self.position.y + self.size.height;

        let (grow_x, grow_y) = match handle {
            ResizeHandle::Se => (dx, dy),
            ResizeHandle::Sw => (-dx, dy),
            ResizeHandle::Ne => (dx, -dy),
            ResizeHandle::Nw => (-dx, -dy),
        };
        let width = (self.size.width + grow_x).max(self.min_size.width);
        let height = (self.size.height + grow_y).max(self.min_size.height);

        if matches!(handle, ResizeHandle::Sw | ResizeHandle::Nw) {
            self.position.x = right - width;
        }
        if matches!(handle, ResizeHandle::Ne | ResizeHandle::Nw) {
            self.position.y = bottom - height;
        }
        self.size = Size { width, height };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> OverlaySurface {
        OverlaySurface::new(
            SurfaceKind::Surrogate,
            &OverlayConfig {
                x: 100.0,
                y: 100.0,
                width: 300.0,
                height: 200.0,
                min_width: 280.0,
                min_height: 120.0,
            },
        )
    }

    #[test]
    fn hide_clears_binding() {
        let mut s = surface();
        s.show_bound(ElementId(4), "draft");
        assert!(s.is_visible());
        assert_eq!(s.bound_element(), Some(ElementId(4)));
        assert_eq!(s.text(), "draft");
        s.hide();
        assert!(!s.is_visible());
        assert_eq!(s.bound_element(), None);
    }

    #[test]
    fn se_resize_grows_without_moving() {
        let mut s = surface();
        s.resize_from(ResizeHandle::Se, 50.0, 10.0);
        assert_eq!(s.position(), Point { x: 100.0, y: 100.0 });
        assert_eq!(s.size(), Size { width: 350.0, height: 210.0 });
    }

    #[test]
    fn nw_resize_keeps_bottom_right_corner_and_clamps() {
        let mut s = surface();
        s.resize_from(ResizeHandle::Nw, 100.0, 100.0);
        assert_eq!(s.size(), Size { width: 280.0, height: 120.0 });
        assert_eq!(s.position(), Point { x: 120.0, y: 180.0 });
    }

    #[test]
    fn drag_moves_position_only() {
        let mut s = surface();
        s.drag_by(-30.0, 15.0);
        assert_eq!(s.position(), Point { x: 70.0, y: 115.0 });
        assert_eq!(s.size(), Size { width: 300.0, height: 200.0 });
    }
}
