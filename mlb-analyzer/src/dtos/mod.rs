pub mod players;
pub mod streaks;
pub mod system;

pub use players::*;
pub use streaks::*;
pub use system::*;
