//! In-memory board repository for tests and offline use.

mod board;

pub use board::{BoardOperation, InMemoryBoardRepository};
