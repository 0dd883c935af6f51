use std::{collections::VecDeque, fmt};

use bevy::{
    math::{ivec2, uvec2, IVec2, UVec2},
    prelude::Resource,
};

use crate::{
    cell::{Cell, Status},
    config::LifeConfig,
    pattern::Pattern,
};

/// What the board populates itself from on start and on reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// percent chance of each cell starting alive
    Random(u8),
    /// stamped in the middle of the board
    Pattern(Pattern),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Evolved,
    /// The new generation repeats one `period` generations back.
    Cycle { period: usize },
    /// A cycle was found and the board reseeded itself.
    Reset { period: usize },
}

/// The simulated matrix: a wrapping grid of cells plus the recent history
/// used to notice when it stops doing anything interesting.
#[derive(Resource, Debug)]
pub struct Board {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    /// scratch buffer, swapped with `cells` every step
    next: Vec<Cell>,
    generation: u64,
    /// status maps of past generations, newest at the front
    history: VecDeque<Vec<bool>>,
    board_copies: usize,
    clear_on_loop: bool,
    seed: Seed,
    rng: fastrand::Rng,
}

impl Board {
    /// Builds a board from an already validated config and seeds it.
    pub fn new(config: &LifeConfig, seed: Seed) -> Self {
        let len = config.width as usize * config.height as usize;
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut board = Self {
            width: config.width,
            height: config.height,
            cells: vec![Cell::DEAD; len],
            next: vec![Cell::DEAD; len],
            generation: 0,
            history: VecDeque::with_capacity(config.board_copies + 1),
            board_copies: config.board_copies,
            clear_on_loop: config.clear_on_loop,
            seed,
            rng,
        };
        board.seed();
        board
    }

    /// Clears the board and repopulates it from its seed.
    pub fn seed(&mut self) {
        self.cells.fill(Cell::DEAD);
        self.generation = 0;
        self.history.clear();

        match &self.seed {
            Seed::Random(likelihood) => {
                let likelihood = *likelihood;
                for cell in self.cells.iter_mut() {
                    if self.rng.u8(0..100) < likelihood {
                        *cell = Cell::born();
                    }
                }
            }
            Seed::Pattern(pattern) => {
                let origin_x = self.width.saturating_sub(pattern.cols() as u32) / 2;
                let origin_y = self.height.saturating_sub(pattern.rows() as u32) / 2;
                let idxs: Vec<_> = pattern
                    .live_cells()
                    .map(|(row, col)| {
                        self.index(uvec2(origin_x + col as u32, origin_y + row as u32))
                    })
                    .collect();
                for idx in idxs {
                    self.cells[idx] = Cell::born();
                }
            }
        }
    }

    /// Advances one generation, then checks whether the board has started repeating itself.
    pub fn step(&mut self) -> StepOutcome {
        self.history.push_front(self.status_map());
        self.history.truncate(self.board_copies);

        for idx in 0..self.cells.len() {
            let live = self
                .neighbour_indices(self.coord(idx))
                .into_iter()
                .filter(|&n| self.cells[n].is_alive())
                .count() as u8;
            self.next[idx] = self.cells[idx].next(live);
        }
        std::mem::swap(&mut self.cells, &mut self.next);
        self.generation += 1;

        let current = self.status_map();
        let Some(period) = self
            .history
            .iter()
            .position(|past| *past == current)
            .map(|i| i + 1)
        else {
            return StepOutcome::Evolved;
        };

        if self.clear_on_loop {
            self.seed();
            StepOutcome::Reset { period }
        } else {
            StepOutcome::Cycle { period }
        }
    }

    fn status_map(&self) -> Vec<bool> {
        self.cells.iter().map(Cell::is_alive).collect()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        uvec2(self.width, self.height)
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Coordinates wrap around the edges.
    #[inline]
    pub fn get(&self, cell_coord: UVec2) -> Cell {
        self.cells[self.index(cell_coord)]
    }

    pub fn set(&mut self, cell_coord: UVec2, status: Status) {
        let idx = self.index(cell_coord);
        self.cells[idx] = match status {
            Status::Alive => Cell::born(),
            Status::Dead => Cell::DEAD,
        };
    }

    #[inline]
    pub fn index(&self, cell_coord: UVec2) -> usize {
        ((cell_coord.y % self.height) * self.width + (cell_coord.x % self.width)) as usize
    }

    #[inline]
    pub fn coord(&self, idx: usize) -> UVec2 {
        uvec2(idx as u32 % self.width, idx as u32 / self.width)
    }

    /// Indices of the 8 surrounding cells on the torus, row by row.
    #[inline]
    fn neighbour_indices(&self, cell_coord: UVec2) -> [usize; 8] {
        let size = self.size().as_ivec2();
        let mut result = [0; 8];
        let offsets = (-1..=1)
            .flat_map(|y| (-1..=1).map(move |x| ivec2(x, y)))
            .filter(|offs| *offs != IVec2::ZERO);
        for (slot, offs) in result.iter_mut().zip(offsets) {
            let pos = (cell_coord.as_ivec2() + offs).rem_euclid(size);
            *slot = self.index(pos.as_uvec2());
        }
        result
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for cell in row {
                f.write_str(if cell.is_alive() { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(width: u32, height: u32, clear_on_loop: bool) -> LifeConfig {
        LifeConfig {
            width,
            height,
            clear_on_loop,
            seed: Some(42),
            ..LifeConfig::default()
        }
    }

    fn empty_board(width: u32, height: u32, clear_on_loop: bool) -> Board {
        Board::new(&config(width, height, clear_on_loop), Seed::Random(0))
    }

    #[test]
    fn indexing_wraps() {
        let board = empty_board(8, 4, false);
        assert_eq!(9, board.index(uvec2(1, 1)));
        assert_eq!(0, board.index(uvec2(8, 4)));
        assert_eq!(7, board.index(uvec2(7, 4)));
        assert_eq!(uvec2(7, 3), board.coord(31));

        let expected = [
            board.index(uvec2(7, 3)),
            board.index(uvec2(0, 3)),
            board.index(uvec2(1, 3)),
            board.index(uvec2(7, 0)),
            board.index(uvec2(1, 0)),
            board.index(uvec2(7, 1)),
            board.index(uvec2(0, 1)),
            board.index(uvec2(1, 1)),
        ];
        assert_eq!(expected, board.neighbour_indices(uvec2(0, 0)));
    }

    #[test]
    fn random_fill_extremes_and_determinism() {
        let board = empty_board(16, 16, false);
        assert_eq!(0, board.population());

        let full = Board::new(&config(16, 16, false), Seed::Random(100));
        assert_eq!(256, full.population());
        assert!(full.cells().iter().all(|cell| cell.age == 0));

        let a = Board::new(&config(16, 16, false), Seed::Random(55));
        let b = Board::new(&config(16, 16, false), Seed::Random(55));
        assert_eq!(a.cells(), b.cells());
        assert!(a.population() > 0 && a.population() < 256);
    }

    #[test]
    fn pattern_is_centred() {
        let board = Board::new(
            &config(64, 32, false),
            Seed::Pattern(Pattern::ideal_glider().clone()),
        );
        assert_eq!(15, board.population());
        // origin is ((64 - 15) / 2, (32 - 9) / 2) = (24, 11)
        assert!(board.get(uvec2(26, 11)).is_alive());
        assert!(board.get(uvec2(24, 13)).is_alive());
        assert!(board.get(uvec2(36, 19)).is_alive());
        assert!(!board.get(uvec2(24, 11)).is_alive());
    }

    #[test]
    fn blinker_has_period_two() {
        let mut board = empty_board(5, 5, false);
        for x in 1..4 {
            board.set(uvec2(x, 2), Status::Alive);
        }
        assert_eq!(StepOutcome::Evolved, board.step());
        assert_eq!(StepOutcome::Cycle { period: 2 }, board.step());
        assert_eq!(2, board.generation());
        // the centre cell survives both generations
        assert_eq!(2, board.get(uvec2(2, 2)).age);
        assert_eq!(0, board.get(uvec2(1, 2)).age);
    }

    #[test]
    fn block_is_still_life() {
        let mut board = empty_board(6, 6, false);
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            board.set(uvec2(x, y), Status::Alive);
        }
        assert_eq!(StepOutcome::Cycle { period: 1 }, board.step());
        assert_eq!(4, board.population());
        assert!(board.cells().iter().filter(|c| c.is_alive()).all(|c| c.age == 1));
    }

    #[test]
    fn empty_board_is_a_cycle() {
        let mut board = empty_board(4, 4, false);
        assert_eq!(StepOutcome::Cycle { period: 1 }, board.step());
    }

    #[test]
    fn glider_keeps_evolving() {
        let mut board = Board::new(
            &config(16, 16, true),
            Seed::Pattern(Pattern::pure_glider()),
        );
        for _ in 0..32 {
            assert_eq!(StepOutcome::Evolved, board.step());
            assert_eq!(5, board.population());
        }
        assert_eq!(32, board.generation());
    }

    #[test]
    fn cycle_resets_when_clear_on_loop() {
        let mut board = Board::new(
            &config(5, 5, true),
            Seed::Pattern(Pattern::parse_plaintext("blinker", "OOO").unwrap()),
        );
        assert_eq!(StepOutcome::Evolved, board.step());
        assert_eq!(StepOutcome::Reset { period: 2 }, board.step());
        assert_eq!(0, board.generation());
        assert!(board.get(uvec2(1, 2)).is_alive());
        assert!(!board.get(uvec2(2, 1)).is_alive());
    }

    #[test]
    fn history_is_bounded() {
        let config = LifeConfig {
            board_copies: 1,
            ..config(5, 5, false)
        };
        let mut board = Board::new(&config, Seed::Random(0));
        for x in 1..4 {
            board.set(uvec2(x, 2), Status::Alive);
        }
        // a period-2 oscillator is invisible with a single retained copy
        assert_eq!(StepOutcome::Evolved, board.step());
        assert_eq!(StepOutcome::Evolved, board.step());
        assert_eq!(1, board.history.len());
    }

    #[test]
    fn display_dump() {
        let mut board = empty_board(3, 2, false);
        board.set(uvec2(1, 0), Status::Alive);
        assert_eq!(".#.\n...\n", board.to_string());
    }
}
