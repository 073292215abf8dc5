//! Conversion pipeline components.
//!
//! - **discovery**: Find source files in the input directory
//! - **decode**: Read a file once, detect its format, decode it
//! - **orientation**: Apply the EXIF orientation tag to the pixels
//! - **resolution**: Plan output dimensions
//! - **encode**: Resize and write WebP
//! - **transcode**: One file through all of the above
//! - **batch**: Resumable, cancellable loop over a directory
//! - **events**: Bounded worker → observer channel

pub mod batch;
pub mod decode;
pub mod discovery;
pub mod encode;
pub mod events;
pub mod orientation;
pub mod resolution;
pub mod transcode;

// Re-exports for convenient access
pub use batch::{BatchPipeline, BatchRequest, BatchRun, BatchState, CancelFlag};
pub use decode::{ImageDecoder, SourceImage};
pub use discovery::FileDiscovery;
pub use encode::{WebpEncoder, MAX_WEBP_DIMENSION};
pub use events::{event_channel, BatchEvent, EventSender};
pub use orientation::{Orientation, OrientationNormalizer};
pub use resolution::ResolutionPlanner;
pub use transcode::{ResolutionChoice, ResolutionChooser, Transcoder};
