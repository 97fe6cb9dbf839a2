pub mod base;
pub mod uniform;

pub use crate::commands::giveaway::strategies::base::WinnerStrategy;
pub use crate::commands::giveaway::strategies::uniform::UniformDrawStrategy;
