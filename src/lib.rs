pub mod cli;
pub mod diagnostic;
pub mod dns;
pub mod network;
pub mod summary;
pub mod utils;

pub use cli::*;
pub use diagnostic::*;
pub use dns::*;
pub use network::*;
pub use summary::*;
pub use utils::*;
