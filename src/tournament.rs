//! Batches of independent AI-vs-AI games, played in parallel

use anyhow::Result;
use indicatif::*;
use rayon::prelude::*;

use std::time::Instant;

use crate::board::{PlayerId, Settings};
use crate::difficulty::Difficulty;
use crate::engine::{Engine, Player};
use crate::game::{Game, GameMode, GameState};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TournamentResult {
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
}

impl TournamentResult {
    pub fn games(&self) -> usize {
        self.first_wins + self.second_wins + self.draws
    }

    fn record(mut self, winner: Option<PlayerId>) -> Self {
        match winner {
            Some(1) => self.first_wins += 1,
            Some(_) => self.second_wins += 1,
            None => self.draws += 1,
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            first_wins: self.first_wins + other.first_wins,
            second_wins: self.second_wins + other.second_wins,
            draws: self.draws + other.draws,
        }
    }
}

/// Plays one full game between two tiers; returns the winner's id
pub fn play_game(
    settings: Settings,
    first: Difficulty,
    second: Difficulty,
    seed: u64,
) -> Result<Option<PlayerId>> {
    let players = vec![
        Player::ai(1, format!("{} (1)", first), first),
        Player::ai(2, format!("{} (2)", second), second),
    ];
    let mut game = Game::new(settings, players, GameMode::Classic)?;
    let mut engine = Engine::with_seed(seed);

    loop {
        let column = match engine.choose_move(&game.move_request()) {
            Some(column) => column,
            None => return Ok(None),
        };
        match game.play(column)? {
            GameState::Playing => continue,
            GameState::Win { player, .. } => return Ok(Some(player)),
            GameState::Draw => return Ok(None),
        }
    }
}

/// Plays `games` games with `first` always moving first.
/// Game `i` uses seed `seed + i`, so a batch is reproducible.
pub fn run(
    settings: Settings,
    first: Difficulty,
    second: Difficulty,
    games: usize,
    seed: u64,
    show_progress: bool,
) -> Result<TournamentResult> {
    let start = Instant::now();
    let progress = if show_progress {
        ProgressBar::new(games as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );
    progress.set_prefix(&format!("{} vs {}", first, second));

    let result = (0..games)
        .into_par_iter()
        .map(|index| {
            let winner = play_game(settings, first, second, seed.wrapping_add(index as u64));
            progress.inc(1);
            winner.map(|winner| TournamentResult::default().record(winner))
        })
        .try_reduce(TournamentResult::default, |a, b| Ok(a.merge(b)))?;

    progress.finish();
    log::info!(
        "{} games of {} vs {} finished in {}",
        games,
        first,
        second,
        HumanDuration(start.elapsed())
    );
    Ok(result)
}
