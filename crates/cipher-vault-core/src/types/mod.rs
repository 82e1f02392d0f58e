//! Domain types shared by the engine, its stores, and the CLI.

mod entry;
mod identifiers;
mod token;
mod vault;

pub use entry::*;
pub use identifiers::*;
pub use token::*;
pub use vault::*;
