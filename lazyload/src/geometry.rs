//! Viewport geometry.
//!
//! Boxes are expressed in viewport-relative pixel coordinates, the same space
//! for the container and for its candidates. A box is always computed fresh
//! from the host: scrolling and resizing invalidate any earlier value.
//!
//! # Visibility policy
//!
//! [`intersects`] is a corner-containment test, not a rectangle overlap test.
//! A candidate counts as visible when its top-left corner or its bottom-right
//! corner lies inside the container (edges inclusive). A candidate larger than
//! the container, or one spanning it with both tested corners outside, is not
//! visible.
//!
//! ```text
//!   container            visible            not visible
//!  ┌─────────┐         ┌─────────┐        ┌─────────┐
//!  │         │         │    ┌────┼──┐   ┌─┼─────────┼─┐
//!  │         │         │    │    │  │   │ │         │ │
//!  └─────────┘         └────┼────┘  │   └─┼─────────┼─┘
//!                           └───────┘     └─────────┘
//! ```

use crate::host::Host;

/// An element rectangle as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementRect {
    /// Left edge of the bounding rectangle.
    pub left: f64,
    /// Top edge of the bounding rectangle.
    pub top: f64,
    /// Content width.
    pub client_width: f64,
    /// Content height.
    pub client_height: f64,
}

impl ElementRect {
    /// Create a rectangle from its origin and content size.
    pub fn new(left: f64, top: f64, client_width: f64, client_height: f64) -> Self {
        Self {
            left,
            top,
            client_width,
            client_height,
        }
    }

    /// Returns this rectangle moved by the given offsets.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }
}

/// Axis-aligned box: `x1`/`x2` are the left/right edges, `y1`/`y2` the
/// top/bottom edges.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportBox {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl ViewportBox {
    /// Builds the box covering an element rectangle.
    pub fn from_rect(rect: &ElementRect) -> Self {
        Self {
            x1: rect.left,
            x2: rect.left + rect.client_width,
            y1: rect.top,
            y2: rect.top + rect.client_height,
        }
    }

    /// Returns true if the point lies inside the box, edges included.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }
}

impl From<ElementRect> for ViewportBox {
    fn from(rect: ElementRect) -> Self {
        Self::from_rect(&rect)
    }
}

/// Reads an element's current box from the host.
pub fn compute_box<H: Host>(host: &H, element: &H::Element) -> ViewportBox {
    ViewportBox::from_rect(&host.bounding_rect(element))
}

/// Corner-containment visibility test; see the module docs.
pub fn intersects(container: &ViewportBox, candidate: &ViewportBox) -> bool {
    container.contains_point(candidate.x1, candidate.y1)
        || container.contains_point(candidate.x2, candidate.y2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bx(x1: f64, y1: f64, x2: f64, y2: f64) -> ViewportBox {
        ViewportBox { x1, x2, y1, y2 }
    }

    #[test]
    fn test_box_from_rect() {
        let rect = ElementRect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(ViewportBox::from_rect(&rect), bx(10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn test_translated_keeps_size() {
        let rect = ElementRect::new(0.0, 500.0, 40.0, 30.0).translated(5.0, -200.0);
        assert_eq!(rect, ElementRect::new(5.0, 300.0, 40.0, 30.0));
    }

    #[test]
    fn test_candidate_fully_inside() {
        let container = bx(0.0, 0.0, 800.0, 600.0);
        assert!(intersects(&container, &bx(10.0, 10.0, 100.0, 100.0)));
    }

    #[test]
    fn test_only_top_left_inside() {
        let container = bx(0.0, 0.0, 800.0, 600.0);
        assert!(intersects(&container, &bx(700.0, 500.0, 900.0, 700.0)));
    }

    #[test]
    fn test_only_bottom_right_inside() {
        let container = bx(0.0, 0.0, 800.0, 600.0);
        assert!(intersects(&container, &bx(-100.0, -100.0, 50.0, 50.0)));
    }

    #[test]
    fn test_edges_are_inclusive() {
        let container = bx(0.0, 0.0, 800.0, 600.0);
        assert!(intersects(&container, &bx(800.0, 600.0, 900.0, 700.0)));
    }

    #[test]
    fn test_far_outside() {
        let container = bx(0.0, 0.0, 800.0, 600.0);
        assert!(!intersects(&container, &bx(0.0, 5000.0, 100.0, 5100.0)));
    }

    #[test]
    fn test_larger_candidate_is_not_visible() {
        // Overlaps the whole container, but neither tested corner is inside.
        let container = bx(100.0, 100.0, 200.0, 200.0);
        assert!(!intersects(&container, &bx(0.0, 0.0, 300.0, 300.0)));
    }

    #[test]
    fn test_band_crossing_container_is_not_visible() {
        // Spans the container horizontally; both tested corners lie outside.
        let container = bx(0.0, 0.0, 100.0, 100.0);
        assert!(!intersects(&container, &bx(-50.0, 20.0, 150.0, 80.0)));
    }

    proptest! {
        #[test]
        fn prop_top_left_inside_is_visible(
            x in 0.0f64..800.0,
            y in 0.0f64..600.0,
            w in 0.0f64..2000.0,
            h in 0.0f64..2000.0,
        ) {
            let container = bx(0.0, 0.0, 800.0, 600.0);
            prop_assert!(intersects(&container, &bx(x, y, x + w, y + h)));
        }

        #[test]
        fn prop_both_corners_outside_on_one_side_is_hidden(
            x in -5000.0f64..5000.0,
            y in 601.0f64..5000.0,
            w in 0.0f64..500.0,
            h in 0.0f64..500.0,
        ) {
            // Entirely below the container.
            let container = bx(0.0, 0.0, 800.0, 600.0);
            prop_assert!(!intersects(&container, &bx(x, y, x + w, y + h)));
        }
    }
}
