use anyhow::{anyhow, Result};

use crate::{MAX_DIMENSION, MIN_DIMENSION, MIN_WIN_LENGTH};

/// Identifier of a player's pieces on the board. Always non-zero.
pub type PlayerId = u8;

/// Game parameters shared by the board and every engine call
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Settings {
    pub rows: usize,
    pub cols: usize,
    pub win_length: usize,
    pub diagonal_enabled: bool,
}

impl Settings {
    pub fn new(rows: usize, cols: usize, win_length: usize, diagonal_enabled: bool) -> Self {
        Self {
            rows,
            cols,
            win_length,
            diagonal_enabled,
        }
    }

    /// Checks the settings a session is about to be created with.
    ///
    /// The engine itself never calls this, it assumes well-formed input.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&self.rows)
            || !(MIN_DIMENSION..=MAX_DIMENSION).contains(&self.cols)
        {
            return Err(anyhow!(
                "Board dimensions must be between {} and {}, got {}x{}",
                MIN_DIMENSION,
                MAX_DIMENSION,
                self.rows,
                self.cols
            ));
        }
        if self.win_length < MIN_WIN_LENGTH {
            return Err(anyhow!(
                "Win length must be at least {}, got {}",
                MIN_WIN_LENGTH,
                self.win_length
            ));
        }
        if self.win_length > self.rows.max(self.cols) {
            return Err(anyhow!(
                "Win length {} does not fit on a {}x{} board",
                self.win_length,
                self.rows,
                self.cols
            ));
        }
        if self.win_length > self.rows.min(self.cols) {
            log::warn!(
                "win length {} exceeds the shorter board side, some directions can never win",
                self.win_length
            );
        }
        Ok(())
    }

    pub fn total_cells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn center_column(&self) -> usize {
        self.cols / 2
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(6, 7, 4, true)
    }
}

/// A rectangular grid of cells, row 0 at the top.
///
/// Pieces settle in the highest-index row that is still empty in their column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    // row-major, top to bottom
    cells: Vec<Option<PlayerId>>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn for_settings(settings: &Settings) -> Self {
        Self::new(settings.rows, settings.cols)
    }

    /// Builds a board from explicit rows, top row first. `0` is an empty cell.
    pub fn from_rows<R: AsRef<[PlayerId]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(anyhow!("Board must have at least one row and one column"));
        }

        let mut cells = Vec::with_capacity(height * width);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(anyhow!(
                    "Row {} has {} cells, expected {}",
                    index,
                    row.len(),
                    width
                ));
            }
            cells.extend(row.iter().map(|&id| if id == 0 { None } else { Some(id) }));
        }
        Ok(Self {
            rows: height,
            cols: width,
            cells,
        })
    }

    /// Replays a sequence of 1-indexed column digits, alternating between
    /// `players` in order.
    pub fn from_moves<S: AsRef<str>>(
        settings: &Settings,
        players: &[PlayerId],
        moves: S,
    ) -> Result<Self> {
        if players.is_empty() {
            return Err(anyhow!("At least one player is required to replay moves"));
        }
        let mut board = Self::for_settings(settings);

        for (turn, column_char) in moves.as_ref().chars().enumerate() {
            match column_char.to_digit(36).map(|c| c as usize) {
                Some(column) if column >= 1 && column <= board.cols => {
                    let column = column - 1;
                    let player = players[turn % players.len()];
                    if board.drop_piece(column, player).is_none() {
                        return Err(anyhow!("Invalid move, column {} full", column + 1));
                    }
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn matches(&self, settings: &Settings) -> bool {
        self.rows == settings.rows && self.cols == settings.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<PlayerId> {
        self.cells[row * self.cols + col]
    }

    /// Cell lookup with signed coordinates, `None` when off the board
    #[inline]
    pub fn get_signed(&self, row: isize, col: isize) -> Option<Option<PlayerId>> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            None
        } else {
            Some(self.get(row as usize, col as usize))
        }
    }

    /// Gravity-drop target: the lowest empty row of `col`
    pub fn lowest_empty_row(&self, col: usize) -> Option<usize> {
        (0..self.rows).rev().find(|&row| self.get(row, col).is_none())
    }

    pub fn playable(&self, col: usize) -> bool {
        col < self.cols && self.get(0, col).is_none()
    }

    pub fn is_full(&self) -> bool {
        (0..self.cols).all(|col| !self.playable(col))
    }

    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn empty_cells(&self) -> usize {
        self.cells.len() - self.piece_count()
    }

    /// Drops a piece for `player` into `col`, returning the row it landed in
    pub fn drop_piece(&mut self, col: usize, player: PlayerId) -> Option<usize> {
        debug_assert!(player != 0, "player ids are non-zero");
        if col >= self.cols {
            return None;
        }
        let row = self.lowest_empty_row(col)?;
        self.cells[row * self.cols + col] = Some(player);
        Some(row)
    }

    /// Sets a cell directly, without gravity
    pub fn set(&mut self, row: usize, col: usize, cell: Option<PlayerId>) {
        self.cells[row * self.cols + col] = cell;
    }

    /// Removes the piece at (row, col). Used to undo a scratch placement.
    pub fn clear(&mut self, row: usize, col: usize) {
        self.set(row, col, None);
    }

    /// Iterates over every occupied cell as (row, col, owner)
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, PlayerId)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| cell.map(|id| (index / cols, index % cols, id)))
    }
}
