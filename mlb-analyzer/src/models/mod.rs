pub mod player;
pub mod schedule;

pub use player::{Hitter, HitterLookup, Pitcher};
pub use schedule::{Game, GameSide, GameStatus, ProbablePitcher, Schedule};
