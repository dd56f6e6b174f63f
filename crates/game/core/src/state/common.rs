use std::fmt;

/// Unit identifier assigned by the game client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World position expressed in game tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this position shifted by the given tile offset.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Exact squared Euclidean distance.
    ///
    /// Use this for radius tests and comparisons; it never loses precision and
    /// avoids the square root.
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Euclidean distance in tiles.
    pub fn distance(self, other: Position) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Returns true if `other` lies within `radius` tiles (inclusive).
    pub fn within(self, other: Position, radius: i32) -> bool {
        let radius = i64::from(radius);
        self.distance_squared(other) <= radius * radius
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_distance_is_exact() {
        let a = Position::new(-3, 4);
        assert_eq!(a.distance_squared(Position::ORIGIN), 25);
        assert_eq!(a.distance(Position::ORIGIN), 5.0);
    }

    #[test]
    fn within_is_inclusive() {
        let center = Position::new(10, 10);
        assert!(center.within(Position::new(13, 14), 5));
        assert!(!center.within(Position::new(14, 14), 5));
    }

    #[test]
    fn large_coordinates_do_not_overflow() {
        let a = Position::new(i32::MAX, 0);
        assert_eq!(
            a.distance_squared(Position::ORIGIN),
            i64::from(i32::MAX) * i64::from(i32::MAX)
        );
    }
}
