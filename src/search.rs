//! Depth-bounded minimax with alpha-beta pruning

use crate::analyzer::{terminal_after_move, terminal_state, valid_moves, Terminal};
use crate::board::{Board, PlayerId, Settings};
use crate::evaluation::evaluate;
use crate::move_ordering::order_moves;

/// Base value of a won position, well above any static evaluation
pub const WIN_SCORE: i32 = 100_000;
/// Bound used for an open search window
pub const INFINITY: i32 = i32::MAX;

/// Caps a per-difficulty depth ceiling by the number of moves left in the game
pub fn adaptive_depth(ceiling: usize, board: &Board) -> usize {
    ceiling.min(board.empty_cells())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub column: usize,
    pub score: i32,
    pub depth: usize,
    pub node_count: usize,
}

/// Minimax search on a private scratch copy of the board.
///
/// Every placement made during the search is undone before the call that
/// made it returns, so the scratch board always matches the snapshot it was
/// built from between calls.
pub struct Searcher<'a> {
    board: Board,
    settings: Settings,
    turn_order: &'a [PlayerId],
    searching: usize,

    /// Nodes visited so far (diagnostics only)
    pub node_count: usize,
}

impl<'a> Searcher<'a> {
    /// `searching` indexes into `turn_order` and names the player scores are computed for
    pub fn new(
        board: &Board,
        settings: Settings,
        turn_order: &'a [PlayerId],
        searching: usize,
    ) -> Self {
        debug_assert!(board.matches(&settings));
        debug_assert!(searching < turn_order.len());
        Self {
            board: board.clone(),
            settings,
            turn_order,
            searching,
            node_count: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn searching_id(&self) -> PlayerId {
        self.turn_order[self.searching]
    }

    fn next(&self, mover: usize) -> usize {
        (mover + 1) % self.turn_order.len()
    }

    fn leaf_value(&self, terminal: Terminal, depth: usize) -> i32 {
        match terminal {
            Terminal::Win(winner) if winner == self.searching_id() => WIN_SCORE + depth as i32,
            Terminal::Win(_) => -WIN_SCORE - depth as i32,
            Terminal::Draw => 0,
            Terminal::Ongoing => evaluate(&self.board, &self.settings, self.searching_id()),
        }
    }

    /// Scores the position with `turn_order[mover]` to move.
    ///
    /// `last` is the cell filled by the previous ply. Without it the whole
    /// board is scanned for a finished game.
    pub fn minimax(
        &mut self,
        depth: usize,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
        mover: usize,
        last: Option<(usize, usize)>,
    ) -> i32 {
        self.node_count += 1;

        let terminal = match last {
            Some((row, col)) => terminal_after_move(&self.board, row, col, &self.settings),
            None => terminal_state(&self.board, &self.settings),
        };
        if depth == 0 || terminal.is_terminal() {
            return self.leaf_value(terminal, depth);
        }

        let player = self.turn_order[mover];
        let candidates = valid_moves(&self.board);
        let ordered = order_moves(
            &mut self.board,
            &self.settings,
            &candidates,
            player,
            last.map(|(_, col)| col),
        );
        let child = self.next(mover);
        let child_maximizing = child == self.searching;

        let mut best = if maximizing { -INFINITY } else { INFINITY };
        for col in ordered {
            let row = match self.board.drop_piece(col, player) {
                Some(row) => row,
                None => continue,
            };
            let last = Some((row, col));
            let score = self.minimax(depth - 1, child_maximizing, alpha, beta, child, last);
            self.board.clear(row, col);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            // the other side will never allow this line
            if beta <= alpha {
                break;
            }
        }
        best
    }

    /// Picks the best column for the searching player, looking `depth` plies ahead
    /// (the root move included).
    pub fn best_move(&mut self, depth: usize) -> Option<SearchResult> {
        let depth = depth.max(1);
        let player = self.searching_id();
        let candidates = valid_moves(&self.board);
        let ordered = order_moves(&mut self.board, &self.settings, &candidates, player, None);
        let child = self.next(self.searching);
        let child_maximizing = child == self.searching;

        let mut alpha = -INFINITY;
        let mut best: Option<(usize, i32)> = None;
        for col in ordered {
            let row = match self.board.drop_piece(col, player) {
                Some(row) => row,
                None => continue,
            };
            let last = Some((row, col));
            let score = self.minimax(depth - 1, child_maximizing, alpha, INFINITY, child, last);
            self.board.clear(row, col);

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((col, score));
            }
            alpha = alpha.max(score);
        }

        let (column, score) = best?;
        log::debug!(
            "searched depth {} for player {}: column {} scores {} ({} nodes)",
            depth,
            player,
            column,
            score,
            self.node_count
        );
        Some(SearchResult {
            column,
            score,
            depth,
            node_count: self.node_count,
        })
    }

    /// Static score after dropping the searching player's piece in `col`,
    /// weighted twice, plus a `depth`-ply search of the reply
    pub fn shallow_score(&mut self, col: usize, depth: usize) -> Option<i32> {
        let player = self.searching_id();
        let row = self.board.drop_piece(col, player)?;
        let child = self.next(self.searching);

        let maximizing = child == self.searching;
        let score = 2 * evaluate(&self.board, &self.settings, player)
            + self.minimax(depth, maximizing, -INFINITY, INFINITY, child, Some((row, col)));
        self.board.clear(row, col);
        Some(score)
    }
}
