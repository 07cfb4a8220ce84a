pub mod error;
pub mod events;
pub mod season;
pub mod types;

pub use error::*;
pub use events::*;
pub use season::*;
pub use types::*;
