use core::fmt;

/// Minor/major axis ratio above which a swipe counts as diagonal (tan 22.5°).
pub const OBLIQUE_RATIO: f64 = 0.414;

/// Compass direction laid out on a 3x3 grid:
///
/// ```text
/// 1 2 3
/// 4 5 6
/// 7 8 9
/// ```
///
/// `Center` (5) is the no-op direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    LeftUp,
    Up,
    RightUp,
    Left,
    Center,
    Right,
    LeftDown,
    Down,
    RightDown,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::LeftUp,
        Direction::Up,
        Direction::RightUp,
        Direction::Left,
        Direction::Center,
        Direction::Right,
        Direction::LeftDown,
        Direction::Down,
        Direction::RightDown,
    ];

    /// Grid position, 1..=9.
    pub fn grid_index(self) -> u8 {
        match self {
            Self::LeftUp => 1,
            Self::Up => 2,
            Self::RightUp => 3,
            Self::Left => 4,
            Self::Center => 5,
            Self::Right => 6,
            Self::LeftDown => 7,
            Self::Down => 8,
            Self::RightDown => 9,
        }
    }

    pub fn from_grid_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index).checked_sub(1)?).copied()
    }

    /// Key used by the config file; `None` for `Center`.
    pub fn config_key(self) -> Option<&'static str> {
        match self {
            Self::LeftUp => Some("left_up"),
            Self::Up => Some("up"),
            Self::RightUp => Some("right_up"),
            Self::Left => Some("left"),
            Self::Center => None,
            Self::Right => Some("right"),
            Self::LeftDown => Some("left_down"),
            Self::Down => Some("down"),
            Self::RightDown => Some("right_down"),
        }
    }

    // Horizontal and vertical steps are each -1, 0 or 1.
    fn from_offsets(horizontal: i8, vertical: i8) -> Self {
        match (horizontal, vertical) {
            (-1, -1) => Self::LeftUp,
            (0, -1) => Self::Up,
            (1, -1) => Self::RightUp,
            (-1, 0) => Self::Left,
            (1, 0) => Self::Right,
            (-1, 1) => Self::LeftDown,
            (0, 1) => Self::Down,
            (1, 1) => Self::RightDown,
            _ => Self::Center,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key().unwrap_or("center"))
    }
}

/// Maps a displacement to one of eight compass directions.
///
/// The dominant axis is picked with a strict `|dx| > |dy|`; the minor axis
/// adds a diagonal component once its share of the major axis exceeds
/// [`OBLIQUE_RATIO`]. A zero vector is `Center`.
pub fn classify(dx: f64, dy: f64) -> Direction {
    if dx == 0.0 && dy == 0.0 {
        return Direction::Center;
    }

    let abs_dx = dx.abs();
    let abs_dy = dy.abs();

    if abs_dx > abs_dy {
        let vertical = if abs_dy / abs_dx > OBLIQUE_RATIO {
            axis_sign(dy)
        } else {
            0
        };
        Direction::from_offsets(axis_sign(dx), vertical)
    } else {
        let horizontal = if abs_dx / abs_dy > OBLIQUE_RATIO {
            axis_sign(dx)
        } else {
            0
        };
        Direction::from_offsets(horizontal, axis_sign(dy))
    }
}

fn axis_sign(value: f64) -> i8 {
    if value < 0.0 {
        -1
    } else {
        1
    }
}
