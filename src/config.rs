//! Session configuration: defaults and interactive prompts

use anyhow::Result;

use std::io::{stdin, stdout, BufRead, Write};

use crate::board::{PlayerId, Settings};
use crate::difficulty::Difficulty;
use crate::engine::Player;
use crate::game::GameMode;
use crate::{MAX_DIMENSION, MAX_PLAYERS, MIN_DIMENSION, MIN_WIN_LENGTH};

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub settings: Settings,
    pub players: Vec<Player>,
    pub mode: GameMode,
}

impl Default for GameConfig {
    /// A classic 6x7 game, human first against an easy AI
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            players: vec![
                Player::human(1, "Player 1"),
                Player::ai(2, "Computer", Difficulty::default()),
            ],
            mode: GameMode::Classic,
        }
    }
}

impl GameConfig {
    /// Asks for every setting on stdin, an empty answer keeps the default
    pub fn prompt() -> Result<Self> {
        let stdin = stdin();
        let mut input = stdin.lock();
        Self::prompt_from(&mut input)
    }

    pub fn prompt_from<R: BufRead>(input: &mut R) -> Result<Self> {
        let defaults = Self::default();

        loop {
            let (min, max) = (MIN_DIMENSION, MAX_DIMENSION);
            let rows = ask_number(input, "Rows", defaults.settings.rows, min, max)?;
            let cols = ask_number(input, "Columns", defaults.settings.cols, min, max)?;
            let win_length = ask_number(
                input,
                "Discs in a row to win",
                defaults.settings.win_length.min(rows.max(cols)),
                MIN_WIN_LENGTH,
                rows.max(cols),
            )?;
            let diagonal_enabled = ask_yes_no(input, "Allow diagonal wins?", true)?;
            let settings = Settings::new(rows, cols, win_length, diagonal_enabled);

            if let Err(err) = settings.validate() {
                println!("{}", err);
                continue;
            }

            let count = ask_number(input, "Number of players", 2, 1, MAX_PLAYERS)?;
            let mut players = Vec::with_capacity(count);
            for index in 0..count {
                let id = (index + 1) as PlayerId;
                let default_ai = index == 1;
                let question = format!("Is player {} AI controlled?", id);
                if ask_yes_no(input, &question, default_ai)? {
                    let difficulty = ask_difficulty(input, id)?;
                    players.push(Player::ai(id, format!("Computer {}", id), difficulty));
                } else {
                    players.push(Player::human(id, format!("Player {}", id)));
                }
            }

            let mode = if ask_yes_no(input, "Limit the number of turns?", false)? {
                let turn_limit =
                    ask_number(input, "Turns per player", 15, 1, settings.total_cells())?;
                GameMode::FixedTurn { turn_limit }
            } else {
                GameMode::Classic
            };

            return Ok(Self {
                settings,
                players,
                mode,
            });
        }
    }
}

fn read_answer<R: BufRead>(input: &mut R, question: &str) -> Result<String> {
    print!("{}", question);
    stdout().flush().expect("failed to flush to stdout!");
    let mut buffer = String::new();
    input.read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}

fn ask_yes_no<R: BufRead>(input: &mut R, question: &str, default: bool) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    loop {
        let answer = read_answer(input, &format!("{} {}: ", question, hint))?;
        match answer.to_lowercase().chars().next() {
            None => return Ok(default),
            Some(_letter @ 'y') => return Ok(true),
            Some(_letter @ 'n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

fn ask_number<R: BufRead>(
    input: &mut R,
    question: &str,
    default: usize,
    min: usize,
    max: usize,
) -> Result<usize> {
    loop {
        let prompt = format!("{} ({}-{}) [{}]: ", question, min, max, default);
        let answer = read_answer(input, &prompt)?;
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<usize>() {
            Ok(number) if (min..=max).contains(&number) => return Ok(number),
            _ => println!("Please enter a number between {} and {}", min, max),
        }
    }
}

fn ask_difficulty<R: BufRead>(input: &mut R, id: PlayerId) -> Result<Difficulty> {
    let names: Vec<&str> = Difficulty::all().iter().map(|difficulty| difficulty.name()).collect();
    let question = format!(
        "Difficulty for player {} ({}) [{}]: ",
        id,
        names.join(", "),
        Difficulty::default()
    );
    let answer = read_answer(input, &question)?;
    if answer.is_empty() {
        return Ok(Difficulty::default());
    }
    Ok(Difficulty::parse_or_default(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn empty_answers_keep_defaults() -> Result<()> {
        let mut input = Cursor::new("\n".repeat(16));
        let config = GameConfig::prompt_from(&mut input)?;
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.players.len(), 2);
        assert!(!config.players[0].is_ai);
        assert!(config.players[1].is_ai);
        assert_eq!(config.players[1].difficulty, Difficulty::Easy);
        assert_eq!(config.mode, GameMode::Classic);
        Ok(())
    }

    #[test]
    fn custom_answers_are_used() -> Result<()> {
        let answers = "5\n8\nx\n5\nn\n3\ny\nvery hard\nn\nY\nMedium\ny\n10\n";
        let mut input = Cursor::new(answers);
        let config = GameConfig::prompt_from(&mut input)?;
        assert_eq!(config.settings, Settings::new(5, 8, 5, false));
        assert_eq!(config.players.len(), 3);
        assert_eq!(config.players[0].difficulty, Difficulty::VeryHard);
        assert!(!config.players[1].is_ai);
        assert_eq!(config.players[2].difficulty, Difficulty::Medium);
        assert_eq!(config.mode, GameMode::FixedTurn { turn_limit: 10 });
        Ok(())
    }
}
