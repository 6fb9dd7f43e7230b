use std::fmt;

/// Two-component vector, used for frame sizes as `Vec2<usize>` (x = width, y = height).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

impl<T: fmt::Debug> fmt::Debug for Vec2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vec2")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for Vec2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

impl<T: Default> Default for Vec2<T> {
    fn default() -> Self {
        Self {
            x: T::default(),
            y: T::default(),
        }
    }
}

impl<T> Vec2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Default> Vec2<T> {
    pub fn zero() -> Self {
        Self::default()
    }
}

impl Vec2<usize> {
    /// Number of elements covered, or `None` on overflow.
    pub fn checked_area(&self) -> Option<usize> {
        self.x.checked_mul(self.y)
    }

    /// Halve both components, rounding up (chroma plane size of a 4:2:0 image).
    pub fn half_up(&self) -> Self {
        Self {
            x: self.x.div_ceil(2),
            y: self.y.div_ceil(2),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x == 0 || self.y == 0
    }
}
