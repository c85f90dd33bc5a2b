pub mod capability;
pub mod error;
pub mod explain;
pub mod pipeline;
pub mod preferences;
pub mod ranking;
pub mod scoring;
pub mod weights;

pub use capability::*;
pub use error::*;
pub use explain::*;
pub use pipeline::*;
pub use preferences::*;
pub use ranking::*;
pub use scoring::*;
pub use weights::*;
