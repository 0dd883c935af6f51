/// Life status of a single LED on the matrix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Alive,
    #[default]
    Dead,
}

impl From<bool> for Status {
    fn from(alive: bool) -> Self {
        if alive {
            Status::Alive
        } else {
            Status::Dead
        }
    }
}

impl From<Status> for bool {
    fn from(status: Status) -> Self {
        matches!(status, Status::Alive)
    }
}

/// One position on the board.
///
/// `age` counts the generations a cell has survived: a newborn cell is 0 and
/// every survived generation adds one, saturating at `u8::MAX`. Dead cells
/// always carry age 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub status: Status,
    pub age: u8,
}

impl Cell {
    pub const DEAD: Cell = Cell {
        status: Status::Dead,
        age: 0,
    };

    #[inline]
    pub fn born() -> Self {
        Self {
            status: Status::Alive,
            age: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status == Status::Alive
    }

    /// The cell's state in the next generation given its live neighbour count (B3/S23).
    #[inline]
    pub fn next(self, live_neighbours: u8) -> Self {
        match (self.status, live_neighbours) {
            (Status::Alive, 2) | (Status::Alive, 3) => Self {
                status: Status::Alive,
                age: self.age.saturating_add(1),
            },
            (Status::Dead, 3) => Self::born(),
            _ => Self::DEAD,
        }
    }
}
