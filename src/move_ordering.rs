//! Cheap pre-sort of candidate columns so alpha-beta cuts off early

use crate::analyzer::active_directions;
use crate::board::{Board, PlayerId, Settings};

const CENTER_WEIGHT: i32 = 4;
const LAST_MOVE_WEIGHT: i32 = 3;
const RUN_COMPLETE: i32 = 100;
const RUN_PIECE: i32 = 10;

/// Insertion-sorted move list that yields the highest score first.
///
/// Among equal scores, moves pushed *later* come out first.
pub struct MoveSorter {
    // column and score, ascending by score
    moves: Vec<(usize, i32)>,
}

impl MoveSorter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            moves: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: usize, score: i32) {
        let mut pos = self.moves.len();
        while pos != 0 && self.moves[pos - 1].1 > score {
            pos -= 1;
        }
        self.moves.insert(pos, (column, score));
    }
}

impl Iterator for MoveSorter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        self.moves.pop().map(|(column, _)| column)
    }
}

/// Sorts `candidates` best-first for `player`, breaking ties by ascending
/// column. The board is restored before returning.
pub fn order_moves(
    board: &mut Board,
    settings: &Settings,
    candidates: &[usize],
    player: PlayerId,
    last_move: Option<usize>,
) -> Vec<usize> {
    let mut sorter = MoveSorter::with_capacity(candidates.len());
    let mut columns = candidates.to_vec();
    columns.sort_unstable();

    // push in descending order so ties pop in ascending order
    for &column in columns.iter().rev() {
        sorter.push(column, score_move(board, settings, column, player, last_move));
    }
    sorter.collect()
}

fn score_move(
    board: &mut Board,
    settings: &Settings,
    column: usize,
    player: PlayerId,
    last_move: Option<usize>,
) -> i32 {
    let center = settings.center_column() as i32;
    let mut score = (CENTER_WEIGHT - (column as i32 - center).abs()).max(0);

    if let Some(last) = last_move {
        score += (LAST_MOVE_WEIGHT - (column as i32 - last as i32).abs()).max(0);
    }

    if let Some(row) = board.drop_piece(column, player) {
        score += probe_runs(board, settings, row, column, player);
        board.clear(row, column);
    }
    score
}

/// Scores the runs through a freshly placed piece
fn probe_runs(board: &Board, settings: &Settings, row: usize, col: usize, player: PlayerId) -> i32 {
    let reach = settings.win_length as isize - 1;
    let mut score = 0;

    for &(dr, dc) in active_directions(settings) {
        let mut run = 0;
        for sign in [-1isize, 1] {
            // pieces cannot sit above a fresh drop
            if dc == 0 && sign == -1 {
                continue;
            }
            let mut step = 1;
            while step <= reach
                && board.get_signed(
                    row as isize + sign * dr * step,
                    col as isize + sign * dc * step,
                ) == Some(Some(player))
            {
                run += 1;
                step += 1;
            }
        }
        score += if run + 1 > reach { RUN_COMPLETE } else { run as i32 * RUN_PIECE };
    }
    score
}
