// Money management module
pub mod money_management;

pub use money_management::{lot_size, LotSizeError, DOLLARS_PER_PIP};
