use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// Operand dimensions disagree with each other or with cached state.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A backward step was requested without the forward state it depends on.
    UninitializedState { what: &'static str },
    /// A computation left its numeric domain (empty batch, non-finite logits).
    NumericDomain { what: &'static str },
    TooManyActivations {
        got: usize,
        max: usize,
    },
    StalePass {
        got: u64,
        expected: u64,
    },
    InvalidDistribution(String),
    InvalidSpec(String),
}

impl MlErr {
    /// Returns `Ok` if `got == expected`, otherwise a `ShapeMismatch` describing `what`.
    pub(crate) fn check_dim(what: &'static str, got: usize, expected: usize) -> Result<()> {
        if got != expected {
            return Err(MlErr::ShapeMismatch {
                what,
                got,
                expected,
            });
        }

        Ok(())
    }
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
            MlErr::UninitializedState { what } => {
                write!(f, "uninitialized state: {what}")
            }
            MlErr::NumericDomain { what } => write!(f, "numeric domain error: {what}"),
            MlErr::TooManyActivations { got, max } => write!(
                f,
                "the model was given {got} activations but only has {max} layers"
            ),
            MlErr::StalePass { got, expected } => write!(
                f,
                "stale forward pass: got pass {got} but the latest forward pass is {expected}"
            ),
            MlErr::InvalidDistribution(msg) => write!(f, "invalid distribution: {msg}"),
            MlErr::InvalidSpec(msg) => write!(f, "invalid model spec: {msg}"),
        }
    }
}

impl Error for MlErr {}

impl From<NormalError> for MlErr {
    fn from(value: NormalError) -> Self {
        Self::InvalidDistribution(value.to_string())
    }
}

impl From<UniformError> for MlErr {
    fn from(value: UniformError) -> Self {
        Self::InvalidDistribution(value.to_string())
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidSpec(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_dim_accepts_equal_sizes() {
        assert!(MlErr::check_dim("columns", 3, 3).is_ok());
    }

    #[test]
    fn check_dim_reports_mismatch() {
        let err = MlErr::check_dim("columns", 2, 3).unwrap_err();

        assert!(matches!(
            err,
            MlErr::ShapeMismatch {
                what: "columns",
                got: 2,
                expected: 3
            }
        ));
        assert_eq!(err.to_string(), "shape mismatch for columns: got 2, expected 3");
    }
}
