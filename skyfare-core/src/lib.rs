pub mod cache;
pub mod cache_key;
pub mod clock;
pub mod dates;
pub mod provider;
pub mod reconstruct;
pub mod request;
pub mod service;
pub mod views;

pub use cache::{CacheError, SearchCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use dates::DateError;
pub use provider::{FlightProvider, UpstreamError};
pub use request::SearchRequest;
pub use service::{SearchError, SearchService};
pub use views::{FlightOption, LayoverView, Leg, Price, SegmentView};
