mod layer;
mod linear;

pub use layer::Layer;
pub use linear::{Linear, ParamsMut};
