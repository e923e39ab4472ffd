use crate::defaults::NAME_ID;
use lapdata_graph::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// A record key names no descriptor binding.
    #[error("descriptor name `{0}` is not bound to any chain")]
    UnknownName(String),

    #[error("no descriptor is bound to the identity name `{}`", NAME_ID)]
    MissingIdentity,

    #[error("object {0} does not exist")]
    ObjectNotFound(ObjectId),

    /// A replace target exists but is not a record root.
    #[error("object {id} is not a member of the identity class `{class}`")]
    NotARoot { id: ObjectId, class: String },

    #[error("invalid record at `{key}`: {message}")]
    InvalidRecord { key: String, message: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
