pub mod augment;
pub mod cache;
pub mod check;
pub mod context;
pub mod error;
pub mod evaluate;
pub mod io;
pub mod matcher;
pub mod paths;
pub mod rule;
pub mod store;
pub mod types;

pub use error::{Result, SteerError};
