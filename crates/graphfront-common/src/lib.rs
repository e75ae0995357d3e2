pub mod error;
pub mod model;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use model::{Model, Node, NodeRole, RtInfo, SharedObject, Variable};
pub use types::{NodeId, Variant};
