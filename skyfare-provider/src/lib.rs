pub mod amadeus;
pub mod iso;
pub mod token;
pub mod travelpayouts;

pub use amadeus::{AmadeusAdapter, AmadeusConfig};
pub use token::TokenCache;
pub use travelpayouts::{TravelpayoutsAdapter, TravelpayoutsConfig};
