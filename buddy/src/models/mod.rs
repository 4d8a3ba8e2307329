mod chat;
mod chunk;
mod search;

pub use chat::*;
pub use chunk::*;
pub use search::*;
