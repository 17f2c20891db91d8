pub mod board;

pub use self::board::*;
