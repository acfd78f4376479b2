use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, EnumIs, Error)]
pub enum BindError {
    /// A value matched none of the wire type classification branches.
    #[error("no wire representation exists for a host value of type `{type_name}`")]
    UnsupportedType { type_name: &'static str },

    /// A bound row's arity differs from the parameter set it targets.
    #[error(
        "bound row carries {actual} values, but the parameter set was created for {expected} parameters"
    )]
    ParameterCountMismatch { expected: usize, actual: usize },

    /// The underlying driver rejected a commit or an execution.
    #[error("driver reported an error: {message}")]
    Driver { message: String },
}

pub type BindResult<T> = Result<T, BindError>;
