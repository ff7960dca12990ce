use glam::{IVec2, Vec2};

/// Axis-aligned box in device pixels, `min` inclusive and `max` exclusive.
/// Any box with no area is empty and compares equal to [`BBox::EMPTY`]
/// after an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BBox {
    pub min: IVec2,
    pub max: IVec2,
}

impl BBox {
    pub const EMPTY: BBox = BBox {
        min: IVec2::ZERO,
        max: IVec2::ZERO,
    };

    pub const fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            min: IVec2::new(x, y),
            max: IVec2::new(x + width, y + height),
        }
    }

    /// Smallest pixel box covering the float rectangle `min..max`.
    pub fn round_out(min: Vec2, max: Vec2) -> Self {
        if !(min.is_finite() && max.is_finite()) {
            return Self::EMPTY;
        }
        let bbox = Self {
            min: min.floor().as_ivec2(),
            max: max.ceil().as_ivec2(),
        };
        if bbox.is_empty() { Self::EMPTY } else { bbox }
    }

    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn intersect(self, other: BBox) -> BBox {
        let bbox = BBox {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        };
        if bbox.is_empty() { BBox::EMPTY } else { bbox }
    }

    pub fn union(self, other: BBox) -> BBox {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        BBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// An empty box is inside every box.
    pub fn contains(self, other: BBox) -> bool {
        other.is_empty()
            || (self.min.x <= other.min.x
                && self.min.y <= other.min.y
                && other.max.x <= self.max.x
                && other.max.y <= self.max.y)
    }

    pub fn contains_point(self, point: Vec2) -> bool {
        point.x >= self.min.x as f32
            && point.y >= self.min.y as f32
            && point.x < self.max.x as f32
            && point.y < self.max.y as f32
    }

    pub fn translate(self, delta: IVec2) -> BBox {
        if self.is_empty() {
            return BBox::EMPTY;
        }
        BBox {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BBox;
    use glam::{IVec2, Vec2};

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = BBox::from_xywh(0, 0, 10, 10);
        let b = BBox::from_xywh(20, 20, 5, 5);
        assert_eq!(a.intersect(b), BBox::EMPTY);
    }

    #[test]
    fn intersection_is_contained_in_both() {
        let a = BBox::from_xywh(0, 0, 10, 10);
        let b = BBox::from_xywh(5, -5, 10, 10);
        let both = a.intersect(b);
        assert_eq!(both, BBox::from_xywh(5, 0, 5, 5));
        assert!(a.contains(both));
        assert!(b.contains(both));
    }

    #[test]
    fn union_ignores_empty_sides() {
        let a = BBox::from_xywh(1, 1, 2, 2);
        assert_eq!(a.union(BBox::EMPTY), a);
        assert_eq!(BBox::EMPTY.union(a), a);
        assert_eq!(
            a.union(BBox::from_xywh(10, 0, 1, 1)),
            BBox::new(IVec2::new(1, 0), IVec2::new(11, 3))
        );
    }

    #[test]
    fn round_out_covers_fractional_edges() {
        let bbox = BBox::round_out(Vec2::new(0.5, 1.2), Vec2::new(3.1, 4.0));
        assert_eq!(bbox, BBox::new(IVec2::new(0, 1), IVec2::new(4, 4)));
        assert_eq!(BBox::round_out(Vec2::NAN, Vec2::ONE), BBox::EMPTY);
    }

    #[test]
    fn point_containment_is_half_open() {
        let bbox = BBox::from_xywh(0, 0, 10, 10);
        assert!(bbox.contains_point(Vec2::new(0.0, 9.5)));
        assert!(!bbox.contains_point(Vec2::new(10.0, 5.0)));
    }
}
