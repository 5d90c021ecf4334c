pub mod activations;
mod builder;
pub mod layers;
pub mod loss;
mod model;

pub use builder::ModelBuilder;
pub use model::{Model, Pass};
