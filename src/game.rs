use anyhow::{anyhow, Result};
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::collections::HashSet;
use std::io::{stdout, Write};

use crate::analyzer::check_win_at;
use crate::board::{Board, PlayerId, Settings};
use crate::engine::{MoveRequest, Player};

const PLAYER_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Cyan,
    Color::White,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum GameMode {
    /// First line of `win_length` wins, a full board is a draw
    #[default]
    Classic,
    /// As classic, but the game also ends once every player has taken
    /// `turn_limit` turns; the most discs on the board wins
    FixedTurn { turn_limit: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    /// `line` holds the winning cells, empty when won on disc count
    Win { player: PlayerId, line: Vec<(usize, usize)> },
    Draw,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameState::Playing)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub player: usize,
    pub row: usize,
    pub col: usize,
}

/// A game session: the live board plus whose turn it is
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    settings: Settings,
    players: Vec<Player>,
    current: usize,
    mode: GameMode,
    state: GameState,
    history: Vec<MoveRecord>,
    turns_taken: Vec<usize>,
    // bumped on every change so stale AI replies can be recognised
    revision: u64,
}

impl Game {
    pub fn new(settings: Settings, players: Vec<Player>, mode: GameMode) -> Result<Self> {
        settings.validate()?;
        if players.is_empty() {
            return Err(anyhow!("At least one player is required"));
        }
        let mut ids = HashSet::new();
        for player in players.iter() {
            if player.id == 0 {
                return Err(anyhow!("Player id 0 is reserved for empty cells"));
            }
            if !ids.insert(player.id) {
                return Err(anyhow!("Player id {} is used twice", player.id));
            }
        }
        if let GameMode::FixedTurn { turn_limit: 0 } = mode {
            return Err(anyhow!("Turn limit must be at least 1"));
        }

        let turns_taken = vec![0; players.len()];
        Ok(Self {
            board: Board::for_settings(&settings),
            settings,
            players,
            current: 0,
            mode,
            state: GameState::Playing,
            history: Vec::new(),
            turns_taken,
            revision: 0,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    /// Snapshot for the engine, using the current player's difficulty
    pub fn move_request(&self) -> MoveRequest {
        MoveRequest::new(
            self.board.clone(),
            self.settings,
            self.players.clone(),
            self.current,
            self.current_player().difficulty,
        )
    }

    pub fn reset(&mut self) {
        self.board = Board::for_settings(&self.settings);
        self.current = 0;
        self.state = GameState::Playing;
        self.history.clear();
        self.turns_taken.iter_mut().for_each(|turns| *turns = 0);
        self.revision += 1;
    }

    /// Plays a 1-indexed column for the current player
    pub fn play_checked(&mut self, column_one_indexed: usize) -> Result<GameState> {
        if column_one_indexed < 1 || column_one_indexed > self.settings.cols {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column_one_indexed,
                self.settings.cols
            ));
        }
        self.play(column_one_indexed - 1)
    }

    /// Plays a 0-indexed column for the current player
    pub fn play(&mut self, column: usize) -> Result<GameState> {
        if self.state.is_over() {
            return Err(anyhow!("The game is already over"));
        }
        let mover = self.current;
        let row = self
            .board
            .drop_piece(column, self.players[mover].id)
            .ok_or_else(|| anyhow!("Invalid move, column {} full", column + 1))?;

        self.history.push(MoveRecord {
            player: mover,
            row,
            col: column,
        });
        self.turns_taken[mover] += 1;
        self.revision += 1;

        self.state = if let Some(line) = check_win_at(&self.board, row, column, &self.settings) {
            GameState::Win {
                player: line.player,
                line: line.cells,
            }
        } else if self.board.is_full() {
            GameState::Draw
        } else if self.turns_exhausted() {
            self.disc_count_result()
        } else {
            GameState::Playing
        };

        if !self.state.is_over() {
            self.current = (self.current + 1) % self.players.len();
        }
        Ok(self.state.clone())
    }

    /// Plays an AI reply that was computed when the session stood at
    /// `revision`. Returns `None` without touching the board when the session
    /// has changed since (undo, reset or another move).
    pub fn apply_reply(
        &mut self,
        revision: u64,
        column: Option<usize>,
    ) -> Result<Option<GameState>> {
        if revision != self.revision {
            log::debug!(
                "dropping a reply computed at revision {}, session is at {}",
                revision,
                self.revision
            );
            return Ok(None);
        }
        let column =
            column.ok_or_else(|| anyhow!("AI found no legal move on an unfinished board"))?;
        self.play(column).map(Some)
    }

    /// Takes back the last move. Finished games cannot be undone.
    pub fn undo(&mut self) -> Result<()> {
        if self.state.is_over() {
            return Err(anyhow!("The game is over"));
        }
        let last = self.history.pop().ok_or_else(|| anyhow!("No moves to undo"))?;
        self.board.clear(last.row, last.col);
        self.turns_taken[last.player] -= 1;
        self.current = last.player;
        self.revision += 1;
        Ok(())
    }

    fn turns_exhausted(&self) -> bool {
        match self.mode {
            GameMode::Classic => false,
            GameMode::FixedTurn { turn_limit } => {
                self.turns_taken.iter().all(|&turns| turns >= turn_limit)
            }
        }
    }

    fn disc_count_result(&self) -> GameState {
        let counts: Vec<(PlayerId, usize)> = self
            .players
            .iter()
            .map(|player| {
                let discs = self.board.occupied().filter(|&(_, _, id)| id == player.id).count();
                (player.id, discs)
            })
            .collect();
        let most = counts.iter().map(|&(_, discs)| discs).max().unwrap_or(0);
        let mut leaders = counts.iter().filter(|&&(_, discs)| discs == most);

        match (leaders.next(), leaders.next()) {
            (Some(&(player, _)), None) => GameState::Win { player, line: Vec::new() },
            _ => GameState::Draw,
        }
    }

    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();

        let cols: String = (1..=self.settings.cols).map(column_label).collect();
        stdout.queue(PrintStyledContent(style(cols + "\n")))?;

        let highlighted: HashSet<(usize, usize)> = match &self.state {
            GameState::Win { line, .. } => line.iter().copied().collect(),
            _ => HashSet::new(),
        };

        for row in 0..self.board.rows() {
            for col in 0..self.board.cols() {
                let cell = self.board.get(row, col);
                let color = match cell {
                    Some(id) => self.color_of(id),
                    None => Color::DarkBlue,
                };
                let background = if highlighted.contains(&(row, col)) {
                    Color::White
                } else {
                    Color::DarkBlue
                };
                stdout.queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(background)
                        .with(color),
                ))?;
            }
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn color_of(&self, id: PlayerId) -> Color {
        let index = self
            .players
            .iter()
            .position(|player| player.id == id)
            .unwrap_or(0);
        PLAYER_COLORS[index % PLAYER_COLORS.len()]
    }
}

/// Single-character label of a 1-indexed column: 1-9, then a, b, c...
pub fn column_label(column_one_indexed: usize) -> char {
    std::char::from_digit(column_one_indexed as u32 % 36, 36).unwrap_or('?')
}

/// Parses a column label or number back into a 1-indexed column
pub fn parse_column(input: &str) -> Option<usize> {
    let input = input.trim();
    if let Ok(column) = input.parse::<usize>() {
        return Some(column);
    }
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(label), None) => label.to_digit(36).map(|column| column as usize),
        _ => None,
    }
}
