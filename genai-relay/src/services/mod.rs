pub mod encoder;
pub mod metrics;
pub mod providers;
pub mod relay;
pub mod staging;

pub use encoder::EncodedPayload;
pub use staging::{StagedFile, StagingArea};
