//! Upstream data shapes and the records derived from them.

mod hero;
mod ids;
mod matches;
mod party;
mod player;
mod pro_match;

pub use hero::*;
pub use ids::*;
pub use matches::*;
pub use party::*;
pub use player::*;
pub use pro_match::*;
