//! Move selection per difficulty tier
//!
//! `Engine::choose_move` is the single entry point used both by the
//! background worker and by the synchronous fallback. All randomness lives
//! here; the search underneath is deterministic.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::analyzer::{find_fork, find_immediate_win, valid_moves};
use crate::board::{Board, PlayerId, Settings};
use crate::difficulty::{Difficulty, Profile};
use crate::search::{adaptive_depth, Searcher};

/// Integer form of "no legal move" for callers that need one
pub const NO_MOVE: i32 = -1;

/// Converts an engine answer into a column index or `NO_MOVE`
pub fn to_sentinel(column: Option<usize>) -> i32 {
    column.map_or(NO_MOVE, |column| column as i32)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_ai: bool,
    pub difficulty: Difficulty,
}

impl Player {
    pub fn human<S: Into<String>>(id: PlayerId, name: S) -> Self {
        Self {
            id,
            name: name.into(),
            is_ai: false,
            difficulty: Difficulty::default(),
        }
    }

    pub fn ai<S: Into<String>>(id: PlayerId, name: S, difficulty: Difficulty) -> Self {
        Self {
            id,
            name: name.into(),
            is_ai: true,
            difficulty,
        }
    }
}

/// Everything the engine needs to pick a move, detached from the live session
#[derive(Clone, Debug)]
pub struct MoveRequest {
    pub board: Board,
    pub settings: Settings,
    pub players: Vec<Player>,
    pub current_player: usize,
    pub difficulty: Difficulty,
}

impl MoveRequest {
    pub fn new(
        board: Board,
        settings: Settings,
        players: Vec<Player>,
        current_player: usize,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            board,
            settings,
            players,
            current_player,
            difficulty,
        }
    }

    pub fn turn_order(&self) -> Vec<PlayerId> {
        self.players.iter().map(|player| player.id).collect()
    }

    pub fn mover(&self) -> PlayerId {
        self.players[self.current_player].id
    }

    /// The next player in rotation, whose threats get blocked
    pub fn opponent(&self) -> PlayerId {
        self.players[(self.current_player + 1) % self.players.len()].id
    }
}

/// Fork hunting only pays off between the opening and the last few moves
fn in_fork_window(board: &Board, settings: &Settings) -> bool {
    let pieces = board.piece_count();
    let earliest = 2 * settings.win_length.saturating_sub(1);
    let latest = settings.total_cells() * 5 / 7;
    pieces > earliest && pieces < latest
}

pub struct Engine {
    rng: StdRng,
    noise_override: Option<f64>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            noise_override: None,
        }
    }

    /// Engine with reproducible randomness
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise_override: None,
        }
    }

    /// Replaces every tier's random-move probability
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise_override = Some(noise.clamp(0.0, 1.0));
        self
    }

    pub fn without_noise(self) -> Self {
        self.with_noise(0.0)
    }

    fn random_move(&mut self, moves: &[usize]) -> Option<usize> {
        moves.choose(&mut self.rng).copied()
    }

    fn noise(&self, profile: &Profile) -> f64 {
        self.noise_override.unwrap_or(profile.noise)
    }

    /// Picks a column for the current player, or `None` if the board is full
    pub fn choose_move(&mut self, request: &MoveRequest) -> Option<usize> {
        let moves = valid_moves(&request.board);
        if moves.is_empty() {
            return None;
        }

        let difficulty = request.difficulty;
        let column = if difficulty == Difficulty::VeryEasy {
            self.random_move(&moves)
        } else {
            let profile = difficulty.profile();
            let noise = self.noise(&profile);
            if noise > 0.0 && self.rng.gen_bool(noise) {
                log::debug!("{} AI plays a random move", difficulty);
                self.random_move(&moves)
            } else {
                Some(Self::think(request, &profile, &moves))
            }
        };

        log::info!("AI level {} move made: {:?}", difficulty.level(), column);
        column
    }

    fn think(request: &MoveRequest, profile: &Profile, moves: &[usize]) -> usize {
        let settings = request.settings;
        let me = request.mover();
        let opponent = request.opponent();
        let mut board = request.board.clone();

        if let Some(column) = find_immediate_win(&mut board, moves, me, &settings) {
            return column;
        }
        if let Some(column) = find_immediate_win(&mut board, moves, opponent, &settings) {
            return column;
        }

        if profile.full_search {
            if profile.create_forks && in_fork_window(&board, &settings) {
                if let Some(column) = find_fork(&mut board, moves, me, &settings) {
                    return column;
                }
                if let Some(column) = find_fork(&mut board, moves, opponent, &settings) {
                    return column;
                }
            }
            Self::search(request, profile.depth, moves)
        } else {
            if profile.block_forks {
                if let Some(column) = find_fork(&mut board, moves, opponent, &settings) {
                    return column;
                }
            }
            Self::rank_shallow(request, profile.depth, moves)
        }
    }

    fn search(request: &MoveRequest, ceiling: usize, moves: &[usize]) -> usize {
        let order = request.turn_order();
        let depth = adaptive_depth(ceiling, &request.board);
        let mut searcher =
            Searcher::new(&request.board, request.settings, &order, request.current_player);
        searcher
            .best_move(depth)
            .map_or(moves[0], |result| result.column)
    }

    /// Greedy ranking: static score after the move plus a shallow look at the replies
    fn rank_shallow(request: &MoveRequest, depth: usize, moves: &[usize]) -> usize {
        let order = request.turn_order();
        // the candidate move itself uses up one empty cell
        let depth = depth.min(request.board.empty_cells().saturating_sub(1));
        let mut searcher =
            Searcher::new(&request.board, request.settings, &order, request.current_player);

        let mut best = (moves[0], i32::MIN);
        for &column in moves {
            if let Some(score) = searcher.shallow_score(column, depth) {
                if score > best.1 {
                    best = (column, score);
                }
            }
        }
        log::debug!("shallow ranking picked column {} ({})", best.0, best.1);
        best.0
    }

    /// Reduced-depth move for when the background worker is unavailable.
    ///
    /// Never adds noise beyond the very easy tier's random play.
    pub fn fallback_move(&mut self, request: &MoveRequest) -> Option<usize> {
        let moves = valid_moves(&request.board);
        if moves.is_empty() {
            return None;
        }
        if request.difficulty == Difficulty::VeryEasy {
            return self.random_move(&moves);
        }

        let settings = request.settings;
        let mut board = request.board.clone();
        if let Some(column) = find_immediate_win(&mut board, &moves, request.mover(), &settings) {
            return Some(column);
        }
        let opponent = request.opponent();
        if let Some(column) = find_immediate_win(&mut board, &moves, opponent, &settings) {
            return Some(column);
        }

        let depth = request.difficulty.profile().fallback_depth;
        Some(Self::search(request, depth, &moves))
    }

    /// Suggests a column for a human player: win, block, center, anything
    pub fn hint(&mut self, request: &MoveRequest) -> Option<usize> {
        let moves = valid_moves(&request.board);
        if moves.is_empty() {
            return None;
        }

        let settings = request.settings;
        let mut board = request.board.clone();
        if let Some(column) = find_immediate_win(&mut board, &moves, request.mover(), &settings) {
            return Some(column);
        }
        let opponent = request.opponent();
        if let Some(column) = find_immediate_win(&mut board, &moves, opponent, &settings) {
            return Some(column);
        }

        let center = settings.center_column();
        if moves.contains(&center) {
            Some(center)
        } else {
            self.random_move(&moves)
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
