//! Static evaluation of a position for one player
//!
//! The score is the sum of independent terms. Offence is weighted slightly
//! above defence, so the scale is intentionally not zero-sum.

use static_assertions::const_assert;

use crate::analyzer::active_directions;
use crate::board::{Board, PlayerId, Settings};

/// Per-piece bonus for owning the middle column
pub const CENTER_BONUS: i32 = 6;

/// Own window one piece short of a win
pub const NEAR_WIN: i32 = 1000;
/// Own window two pieces short of a win
pub const TWO_AWAY: i32 = 100;
/// Own window three pieces short of a win
pub const THREE_AWAY: i32 = 10;
/// Credit per piece for any other live own window
pub const PIECE_CREDIT: i32 = 3;

pub const OPPONENT_NEAR_WIN: i32 = 900;
pub const OPPONENT_TWO_AWAY: i32 = 90;
pub const OPPONENT_THREE_AWAY: i32 = 9;

/// Per adjacent (8-neighbour) own piece
pub const CONNECTIVITY_BONUS: i32 = 2;
/// Per own piece without an orthogonal own neighbour
pub const ISOLATION_PENALTY: i32 = 1;
pub const ISOLATION_WEIGHT: i32 = 3;

pub const ROW_WEIGHT: i32 = 2;
pub const SUPPORT_BONUS: i32 = 3;
pub const COLUMN_CONTROL_BONUS: i32 = 5;

const_assert!(NEAR_WIN > TWO_AWAY && TWO_AWAY > THREE_AWAY);
const_assert!(OPPONENT_NEAR_WIN < NEAR_WIN);
const_assert!(OPPONENT_TWO_AWAY < TWO_AWAY);
const_assert!(OPPONENT_THREE_AWAY < THREE_AWAY);
const_assert!(OPPONENT_NEAR_WIN > OPPONENT_TWO_AWAY && OPPONENT_TWO_AWAY > OPPONENT_THREE_AWAY);
// a two-away window outweighs a fully surrounded piece
const_assert!(TWO_AWAY > 8 * CONNECTIVITY_BONUS);
const_assert!(ISOLATION_PENALTY * ISOLATION_WEIGHT > CONNECTIVITY_BONUS);

const NEIGHBOURS_8: [(isize, isize); 8] = [
    (0, 1),
    (1, 0),
    (1, 1),
    (1, -1),
    (0, -1),
    (-1, 0),
    (-1, -1),
    (-1, 1),
];
const NEIGHBOURS_4: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Cell tally of one window
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowCounts {
    pub own: usize,
    pub opponent: usize,
    pub empty: usize,
}

/// Heuristic score of `board` for `player`, higher is better for them
pub fn evaluate(board: &Board, settings: &Settings, player: PlayerId) -> i32 {
    let mut score = center_score(board, settings, player);
    score += windows_score(board, settings, player);
    score += connectivity_score(board, player);
    score -= isolated_pieces(board, player) * ISOLATION_PENALTY * ISOLATION_WEIGHT;
    score += positional_score(board, player);
    score += height_score(board, player);
    score
}

fn center_score(board: &Board, settings: &Settings, player: PlayerId) -> i32 {
    let center = settings.center_column();
    if center >= board.cols() {
        return 0;
    }
    (0..board.rows())
        .filter(|&row| board.get(row, center) == Some(player))
        .map(|row| CENTER_BONUS + row as i32 + 1)
        .sum()
}

/// Scores a single window from the point of view of its owner
pub fn score_window(counts: WindowCounts, win_length: usize) -> i32 {
    let WindowCounts { own, opponent, empty } = counts;

    // dead window, nobody can complete it
    if own > 0 && opponent > 0 {
        return 0;
    }

    if own > 0 {
        return match win_length - own {
            1 if empty == 1 => NEAR_WIN,
            2 if empty == 2 => TWO_AWAY,
            3 if empty == 3 => THREE_AWAY,
            _ => own as i32 * PIECE_CREDIT,
        };
    }

    if opponent > 0 {
        return match win_length - opponent {
            1 if empty == 1 => -OPPONENT_NEAR_WIN,
            2 if empty == 2 => -OPPONENT_TWO_AWAY,
            3 if empty == 3 => -OPPONENT_THREE_AWAY,
            _ => 0,
        };
    }

    0
}

fn windows_score(board: &Board, settings: &Settings, player: PlayerId) -> i32 {
    let length = settings.win_length as isize;
    if length == 0 {
        return 0;
    }
    let mut score = 0;

    for &(dr, dc) in active_directions(settings) {
        for row in 0..board.rows() as isize {
            for col in 0..board.cols() as isize {
                let end_row = row + dr * (length - 1);
                let end_col = col + dc * (length - 1);
                if board.get_signed(end_row, end_col).is_none() {
                    continue;
                }

                let mut counts = WindowCounts::default();
                for i in 0..length {
                    match board.get((row + dr * i) as usize, (col + dc * i) as usize) {
                        Some(id) if id == player => counts.own += 1,
                        Some(_) => counts.opponent += 1,
                        None => counts.empty += 1,
                    }
                }
                score += score_window(counts, settings.win_length);
            }
        }
    }
    score
}

fn count_neighbours(
    board: &Board,
    row: usize,
    col: usize,
    player: PlayerId,
    offsets: &[(isize, isize)],
) -> i32 {
    offsets
        .iter()
        .filter(|(dr, dc)| {
            board.get_signed(row as isize + dr, col as isize + dc) == Some(Some(player))
        })
        .count() as i32
}

fn connectivity_score(board: &Board, player: PlayerId) -> i32 {
    board
        .occupied()
        .filter(|&(_, _, id)| id == player)
        .map(|(row, col, _)| {
            count_neighbours(board, row, col, player, &NEIGHBOURS_8) * CONNECTIVITY_BONUS
        })
        .sum()
}

fn isolated_pieces(board: &Board, player: PlayerId) -> i32 {
    board
        .occupied()
        .filter(|&(row, col, id)| {
            id == player && count_neighbours(board, row, col, player, &NEIGHBOURS_4) == 0
        })
        .count() as i32
}

/// Lower rows and supported pieces are more stable
fn positional_score(board: &Board, player: PlayerId) -> i32 {
    let bottom = board.rows() - 1;
    board
        .occupied()
        .filter(|&(_, _, id)| id == player)
        .map(|(row, col, _)| {
            let mut score = (row as i32 + 1) * ROW_WEIGHT;
            if row < bottom && board.get(row + 1, col).is_some() {
                score += SUPPORT_BONUS;
            }
            score
        })
        .sum()
}

fn height_score(board: &Board, player: PlayerId) -> i32 {
    let mut score = 0;
    for col in 0..board.cols() {
        let mut own = 0;
        let mut other = 0;
        for row in 0..board.rows() {
            match board.get(row, col) {
                Some(id) if id == player => {
                    own += 1;
                    score += row as i32 + 1;
                }
                Some(_) => other += 1,
                None => {}
            }
        }
        if own > other {
            score += COLUMN_CONTROL_BONUS;
        }
    }
    score
}
