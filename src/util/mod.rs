pub mod option_iter;

pub use self::option_iter::*;
