pub mod arch;
pub mod error;
pub mod gradcheck;
pub mod initialization;
pub mod specs;

pub use error::{MlErr, Result};
