pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::Config;

pub mod requirements;
pub use requirements::Pin;
pub use requirements::PinLine;

pub mod conflict;
pub use conflict::ConflictRecord;

pub mod fix;
pub mod explain;
pub mod snapshot;

pub mod analysis;
pub use analysis::Analysis;
pub use analysis::Explanation;
