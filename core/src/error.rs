use crate::topo::EntityId;
use crate::variables::ParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlaneError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaneError {
    #[error("No item with id {0}")]
    NotFound(EntityId),
    #[error("Item {id} is not a {expected}")]
    WrongKind { id: EntityId, expected: &'static str },
    #[error("Cannot {action} item {id}")]
    NotAllowed { id: EntityId, action: &'static str },
    #[error("Item {0} is fixed")]
    Fixed(EntityId),
    #[error("Invalid attribute '{key}': {message}")]
    Attribute { key: String, message: String },
    #[error("Invalid formula: {0}")]
    Formula(#[from] ParseError),
}
