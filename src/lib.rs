pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mutator;
pub mod password;
pub mod router;

pub use error::MenuDbError;
pub use mutator::{Mutation, Outcome};
