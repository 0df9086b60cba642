pub mod spaces;

pub use spaces::{SpacesConfig, SpacesStorage};
