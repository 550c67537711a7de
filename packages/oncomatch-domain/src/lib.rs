pub mod age;
pub mod criteria;
pub mod date_serde;
pub mod query;
pub mod sample;
pub mod taxonomy;
pub mod tree;
pub mod trial;
pub mod trial_match;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
