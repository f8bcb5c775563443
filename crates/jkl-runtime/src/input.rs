//! Eight-way movement direction from the arrow/WASD key state

use glam::Vec2;

/// Held state of the four direction keys for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionKeys {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

impl DirectionKeys {
    pub const NONE: Self = Self {
        up: false,
        right: false,
        down: false,
        left: false,
    };

    pub fn any(&self) -> bool {
        self.up || self.right || self.down || self.left
    }
}

/// Compass direction, numbered clockwise from up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputDirection {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    #[default]
    None,
}

impl InputDirection {
    /// Resolve the key state into a direction
    ///
    /// Single keys are applied first in the order up, right, down, left, each
    /// overriding the previous. Diagonals are applied next in the order
    /// up-right, right-down, down-left, left-up, again with the later one
    /// winning. Opposing keys therefore do not cancel.
    pub fn from_keys(keys: DirectionKeys) -> Self {
        let mut direction = Self::None;

        if keys.up {
            direction = Self::Up;
        }
        if keys.right {
            direction = Self::Right;
        }
        if keys.down {
            direction = Self::Down;
        }
        if keys.left {
            direction = Self::Left;
        }

        if keys.up && keys.right {
            direction = Self::UpRight;
        }
        if keys.right && keys.down {
            direction = Self::DownRight;
        }
        if keys.down && keys.left {
            direction = Self::DownLeft;
        }
        if keys.left && keys.up {
            direction = Self::UpLeft;
        }

        direction
    }

    /// `0..=7` clockwise from up, `-1` for none
    pub fn index(self) -> i32 {
        match self {
            Self::Up => 0,
            Self::UpRight => 1,
            Self::Right => 2,
            Self::DownRight => 3,
            Self::Down => 4,
            Self::DownLeft => 5,
            Self::Left => 6,
            Self::UpLeft => 7,
            Self::None => -1,
        }
    }

    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Up,
            1 => Self::UpRight,
            2 => Self::Right,
            3 => Self::DownRight,
            4 => Self::Down,
            5 => Self::DownLeft,
            6 => Self::Left,
            7 => Self::UpLeft,
            _ => Self::None,
        }
    }

    /// Unit vector with +y up and +x right, zero for none
    pub fn to_vector(self) -> Vec2 {
        let v = match self {
            Self::Up => Vec2::Y,
            Self::UpRight => Vec2::new(1.0, 1.0),
            Self::Right => Vec2::X,
            Self::DownRight => Vec2::new(1.0, -1.0),
            Self::Down => Vec2::NEG_Y,
            Self::DownLeft => Vec2::new(-1.0, -1.0),
            Self::Left => Vec2::NEG_X,
            Self::UpLeft => Vec2::new(-1.0, 1.0),
            Self::None => Vec2::ZERO,
        };
        v.normalize_or_zero()
    }
}
