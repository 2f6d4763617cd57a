use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};

/// AI strength tiers, weakest first
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Difficulty {
    /// Uniformly random legal column
    VeryEasy,
    /// Win/block tactics, otherwise a shallow search, with frequent random moves
    #[default]
    Easy,
    /// Adds opponent fork blocking and a slightly deeper search
    Medium,
    /// Move-ordered minimax at an adaptive depth
    Hard,
    /// Deepest search, fork detection in the middle game, no random moves
    VeryHard,
}

/// How a tier composes the engine
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Profile {
    /// Chance of playing a uniformly random column instead of thinking
    pub noise: f64,
    /// Depth ceiling of the search, before the empty-cell cap
    pub depth: usize,
    /// Whether the full minimax decides the move (otherwise the greedy ranking does)
    pub full_search: bool,
    pub block_forks: bool,
    pub create_forks: bool,
    /// Depth used when the background worker is unavailable
    pub fallback_depth: usize,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[
            Difficulty::VeryEasy,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::VeryHard,
        ]
    }

    /// Tier number from 1 (weakest) to 5
    pub fn level(&self) -> usize {
        *self as usize + 1
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::VeryEasy => "very easy",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::VeryHard => "very hard",
        }
    }

    /// Parses a tier name, falling back to the default tier for anything unknown
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("unknown difficulty '{}', using '{}'", name, Difficulty::default());
            Difficulty::default()
        })
    }

    pub fn profile(&self) -> Profile {
        match self {
            Difficulty::VeryEasy => Profile {
                noise: 1.0,
                depth: 0,
                full_search: false,
                block_forks: false,
                create_forks: false,
                fallback_depth: 0,
            },
            Difficulty::Easy => Profile {
                noise: 0.3,
                depth: 2,
                full_search: false,
                block_forks: false,
                create_forks: false,
                fallback_depth: 2,
            },
            Difficulty::Medium => Profile {
                noise: 0.1,
                depth: 3,
                full_search: false,
                block_forks: true,
                create_forks: false,
                fallback_depth: 2,
            },
            Difficulty::Hard => Profile {
                noise: 0.02,
                depth: 6,
                full_search: true,
                block_forks: false,
                create_forks: false,
                fallback_depth: 3,
            },
            Difficulty::VeryHard => Profile {
                noise: 0.0,
                depth: 7,
                full_search: true,
                block_forks: true,
                create_forks: true,
                fallback_depth: 3,
            },
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace(|c: char| c == '_' || c == '-', " ");
        match normalised.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "very easy" | "1" => Ok(Difficulty::VeryEasy),
            "easy" | "2" => Ok(Difficulty::Easy),
            "medium" | "3" => Ok(Difficulty::Medium),
            "hard" | "4" => Ok(Difficulty::Hard),
            "very hard" | "5" => Ok(Difficulty::VeryHard),
            _ => Err(anyhow!("unknown difficulty '{}'", s)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("Very Hard".parse::<Difficulty>().unwrap(), Difficulty::VeryHard);
        assert_eq!("VERY EASY".parse::<Difficulty>().unwrap(), Difficulty::VeryEasy);
        assert_eq!("  medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("very_hard".parse::<Difficulty>().unwrap(), Difficulty::VeryHard);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn unknown_names_fall_back_to_easy() {
        assert_eq!(Difficulty::parse_or_default("grandmaster"), Difficulty::Easy);
        assert_eq!(Difficulty::parse_or_default("hard"), Difficulty::Hard);
    }

    #[test]
    fn tiers_get_stronger() {
        for pair in Difficulty::all().windows(2) {
            let (weaker, stronger) = (pair[0].profile(), pair[1].profile());
            assert!(weaker.noise >= stronger.noise);
            assert!(weaker.depth <= stronger.depth);
        }
        assert_eq!(Difficulty::VeryHard.level(), 5);
    }
}
