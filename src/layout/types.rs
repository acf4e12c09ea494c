//! Value types produced by the layout engine
//!
//! These are plain snapshots of solved geometry. They hold no solver state and
//! are what rendering and export code consumes.

/// A 2D point in chart pixel space (y grows upward from the canvas bottom)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Primary label
    pub label: Option<String>,
    /// Secondary label, used by histograms for interval boundaries
    pub secondary_label: Option<String>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: None,
            secondary_label: None,
        }
    }
}

/// A solved rectangle: two corners, a color and a name
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub left_bottom: Point,
    pub right_top: Point,
    pub color: String,
    pub name: String,
}

impl Rectangle {
    /// Horizontal extent
    pub fn width(&self) -> f64 {
        self.right_top.x - self.left_bottom.x
    }

    /// Signed vertical extent (negative for a falling candle body)
    pub fn height(&self) -> f64 {
        self.right_top.y - self.left_bottom.y
    }

    pub fn center_x(&self) -> f64 {
        (self.left_bottom.x + self.right_top.x) / 2.0
    }

    /// Lower of the two corner levels
    pub fn bottom(&self) -> f64 {
        self.left_bottom.y.min(self.right_top.y)
    }

    /// Upper of the two corner levels
    pub fn top(&self) -> f64 {
        self.left_bottom.y.max(self.right_top.y)
    }

    /// Check if a point lies inside the rectangle (edges included)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left_bottom.x && x <= self.right_top.x && y >= self.bottom() && y <= self.top()
    }
}

/// A solved candle: a body between opening and closing level plus a wick
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    /// Body; `left_bottom` is the opening corner, `right_top` the closing corner
    pub body: Rectangle,
    pub wick_bottom: Point,
    pub wick_top: Point,
    /// Whether the candle name is drawn
    pub name_visible: bool,
}

impl Candle {
    pub fn name(&self) -> &str {
        &self.body.name
    }

    pub fn color(&self) -> &str {
        &self.body.color
    }

    pub fn opening_corner(&self) -> &Point {
        &self.body.left_bottom
    }

    pub fn closing_corner(&self) -> &Point {
        &self.body.right_top
    }

    pub fn opening(&self) -> f64 {
        self.body.left_bottom.y
    }

    pub fn closing(&self) -> f64 {
        self.body.right_top.y
    }

    pub fn minimum(&self) -> f64 {
        self.wick_bottom.y
    }

    pub fn maximum(&self) -> f64 {
        self.wick_top.y
    }

    /// True when the closing level is not below the opening level
    pub fn is_rising(&self) -> bool {
        self.closing() >= self.opening()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rectangle {
        Rectangle {
            left_bottom: Point::new(x0, y0),
            right_top: Point::new(x1, y1),
            color: "blue".to_string(),
            name: "r".to_string(),
        }
    }

    #[test]
    fn test_point_creation() {
        let p = Point::new(10.0, 20.0);
        assert_eq!(p.x, 10.0);
        assert_eq!(p.y, 20.0);
        assert!(p.label.is_none());
    }

    #[test]
    fn test_rectangle_extents() {
        let r = rect(10.0, 0.0, 30.0, 50.0);
        assert_eq!(r.width(), 20.0);
        assert_eq!(r.height(), 50.0);
        assert_eq!(r.center_x(), 20.0);
    }

    #[test]
    fn test_falling_body_has_negative_height() {
        let r = rect(0.0, 40.0, 10.0, 25.0);
        assert_eq!(r.height(), -15.0);
        assert_eq!(r.bottom(), 25.0);
        assert_eq!(r.top(), 40.0);
        assert!(r.contains(5.0, 30.0));
        assert!(!r.contains(5.0, 41.0));
    }

    #[test]
    fn test_candle_levels() {
        let candle = Candle {
            body: rect(0.0, 10.0, 20.0, 20.0),
            wick_bottom: Point::new(10.0, 5.0),
            wick_top: Point::new(10.0, 25.0),
            name_visible: false,
        };
        assert_eq!(candle.opening(), 10.0);
        assert_eq!(candle.closing(), 20.0);
        assert_eq!(candle.minimum(), 5.0);
        assert_eq!(candle.maximum(), 25.0);
        assert!(candle.is_rising());
    }
}
