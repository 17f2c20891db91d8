pub mod prelude;
pub mod record;
pub mod session;
pub mod share;
pub mod verdict;
pub mod words;

pub use self::prelude::*;
pub use self::record::*;
pub use self::session::*;
pub use self::share::*;
pub use self::verdict::*;
pub use self::words::*;
