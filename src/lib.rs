//! An artificial opponent for generalised 'Connect N'
//!
//! Boards of any size are supported, with a configurable number of discs in
//! a row needed to win and optional diagonal wins. Five difficulty tiers
//! range from random play to a move-ordered alpha-beta search.
//!
//! # Basic Usage
//!
//! ```
//! use connectn_ai::{board::*, difficulty::Difficulty, engine::*};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let settings = Settings::default();
//! let board = Board::from_moves(&settings, &[1, 2], "112233")?;
//! let players = vec![
//!     Player::human(1, "You"),
//!     Player::ai(2, "Computer", Difficulty::Hard),
//! ];
//! let request = MoveRequest::new(board, settings, players, 1, Difficulty::Hard);
//!
//! // player 1 threatens to complete the bottom row
//! let column = Engine::new().without_noise().choose_move(&request);
//! assert_eq!(column, Some(3));
//!# Ok(())
//!# }
//! ```

pub use anyhow;

pub mod board;

pub mod analyzer;

pub mod evaluation;

pub mod move_ordering;

pub mod search;

pub mod difficulty;

pub mod engine;

pub mod worker;

pub mod game;

pub mod config;

pub mod tournament;

mod test;

/// The smallest supported number of rows or columns
pub const MIN_DIMENSION: usize = 3;

/// The largest supported number of rows or columns
pub const MAX_DIMENSION: usize = 16;

/// The shortest line that may be required to win
pub const MIN_WIN_LENGTH: usize = 3;

/// The most players a session can rotate through
pub const MAX_PLAYERS: usize = 6;
