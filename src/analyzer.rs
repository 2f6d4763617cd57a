//! Move validity and terminal-state detection

use crate::board::{Board, PlayerId, Settings};

/// The four scan directions as (row step, column step): horizontal,
/// vertical, diagonal down-right and diagonal down-left
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Directions that count towards a win under `settings`
pub fn active_directions(settings: &Settings) -> &'static [(isize, isize)] {
    if settings.diagonal_enabled {
        &DIRECTIONS
    } else {
        &DIRECTIONS[..2]
    }
}

/// A completed line, trimmed to exactly `win_length` cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinningLine {
    pub player: PlayerId,
    /// (row, col) pairs in line order
    pub cells: Vec<(usize, usize)>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Terminal {
    Ongoing,
    Win(PlayerId),
    Draw,
}

impl Terminal {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Terminal::Ongoing)
    }
}

/// Playable columns in ascending order
pub fn valid_moves(board: &Board) -> Vec<usize> {
    (0..board.cols()).filter(|&col| board.playable(col)).collect()
}

/// Checks whether the piece at (row, col) is part of a winning line.
///
/// Returns `None` for an empty cell.
pub fn check_win_at(
    board: &Board,
    row: usize,
    col: usize,
    settings: &Settings,
) -> Option<WinningLine> {
    let player = board.get(row, col)?;
    let reach = settings.win_length.saturating_sub(1) as isize;

    for &(dr, dc) in active_directions(settings) {
        // walk backwards first so the collected run is in line order
        let mut back = 0;
        while back < reach && owned(board, row, col, -dr * (back + 1), -dc * (back + 1), player) {
            back += 1;
        }
        let mut forward = 0;
        while forward < reach
            && owned(board, row, col, dr * (forward + 1), dc * (forward + 1), player)
        {
            forward += 1;
        }

        if (back + forward + 1) as usize >= settings.win_length {
            // back <= win_length - 1, so the origin stays inside the trimmed run
            let start_row = row as isize - dr * back;
            let start_col = col as isize - dc * back;
            let cells = (0..)
                .map(|i| ((start_row + dr * i) as usize, (start_col + dc * i) as usize))
                .take(settings.win_length)
                .collect();
            return Some(WinningLine { player, cells });
        }
    }
    None
}

/// Is the cell offset from (row, col) on the board and owned by `player`?
fn owned(board: &Board, row: usize, col: usize, dr: isize, dc: isize, player: PlayerId) -> bool {
    board.get_signed(row as isize + dr, col as isize + dc) == Some(Some(player))
}

/// Classifies a whole board by re-checking every occupied cell
pub fn terminal_state(board: &Board, settings: &Settings) -> Terminal {
    for (row, col, _) in board.occupied() {
        if let Some(line) = check_win_at(board, row, col, settings) {
            return Terminal::Win(line.player);
        }
    }
    if board.is_full() {
        Terminal::Draw
    } else {
        Terminal::Ongoing
    }
}

/// Classifies a board given the cell that was just filled, assuming the
/// position before that placement was not terminal
pub fn terminal_after_move(board: &Board, row: usize, col: usize, settings: &Settings) -> Terminal {
    match check_win_at(board, row, col, settings) {
        Some(line) => Terminal::Win(line.player),
        None if board.is_full() => Terminal::Draw,
        None => Terminal::Ongoing,
    }
}

/// Would dropping a `player` piece into `col` win on the spot?
///
/// The board is restored before returning.
pub fn is_winning_drop(
    board: &mut Board,
    col: usize,
    player: PlayerId,
    settings: &Settings,
) -> bool {
    match board.drop_piece(col, player) {
        Some(row) => {
            let wins = check_win_at(board, row, col, settings).is_some();
            board.clear(row, col);
            wins
        }
        None => false,
    }
}

/// First column (in the order of `candidates`) that wins immediately for `player`
pub fn find_immediate_win(
    board: &mut Board,
    candidates: &[usize],
    player: PlayerId,
    settings: &Settings,
) -> Option<usize> {
    candidates
        .iter()
        .copied()
        .find(|&col| is_winning_drop(board, col, player, settings))
}

/// Number of columns other than `except` that would complete a win for `player`
pub fn count_threats(
    board: &mut Board,
    candidates: &[usize],
    except: usize,
    player: PlayerId,
    settings: &Settings,
) -> usize {
    candidates
        .iter()
        .filter(|&&col| col != except)
        .filter(|&&col| is_winning_drop(board, col, player, settings))
        .count()
}

/// First move after which `player` threatens to win in two or more other
/// columns at once
pub fn find_fork(
    board: &mut Board,
    candidates: &[usize],
    player: PlayerId,
    settings: &Settings,
) -> Option<usize> {
    for &col in candidates {
        let row = match board.drop_piece(col, player) {
            Some(row) => row,
            None => continue,
        };
        let threats = count_threats(board, candidates, col, player, settings);
        board.clear(row, col);

        if threats >= 2 {
            return Some(col);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn winning_line_is_trimmed_to_win_length() -> Result<()> {
        let settings = Settings::new(4, 6, 3, true);
        let board = Board::from_rows(&[
            [0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0],
            [1, 1, 1, 1, 1, 0],
        ])?;
        let line = check_win_at(&board, 3, 2, &settings).expect("horizontal win");
        assert_eq!(line.player, 1);
        assert_eq!(line.cells.len(), 3);
        assert!(line.cells.contains(&(3, 2)));
        for pair in line.cells.windows(2) {
            assert_eq!(pair[0].0, pair[1].0);
            assert_eq!(pair[0].1 + 1, pair[1].1);
        }
        Ok(())
    }

    #[test]
    fn empty_cell_never_wins() {
        let settings = Settings::default();
        let board = Board::for_settings(&settings);
        assert_eq!(check_win_at(&board, 5, 3, &settings), None);
    }

    #[test]
    fn fork_is_found() -> Result<()> {
        // player 1 playing column 3 makes an open three
        let settings = Settings::new(6, 7, 4, false);
        let mut board = Board::from_rows(&[
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 1, 0, 1, 0, 0],
        ])?;
        let before = board.clone();
        let moves = valid_moves(&board);
        assert_eq!(find_fork(&mut board, &moves, 1, &settings), Some(3));
        assert_eq!(board, before);
        Ok(())
    }
}
