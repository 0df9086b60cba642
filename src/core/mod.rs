pub mod registry;

pub use crate::domain::model::{Credentials, Opts};
pub use crate::domain::ports::{CredentialProvider, Storage};
pub use crate::utils::error::Result;
