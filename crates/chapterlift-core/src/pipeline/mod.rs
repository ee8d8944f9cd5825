//! Page pipeline components.
//!
//! - **discovery**: find page images in a chapter directory
//! - **hash**: content fingerprints for dedup
//! - **naming**: remote object keys
//! - **transform**: decode, shrink, re-encode
//! - **scheduler**: bounded fan-out of one task per page

pub mod discovery;
pub mod hash;
pub mod naming;
pub mod scheduler;
pub mod transform;

pub use discovery::{ChapterDiscovery, DiscoveredFile};
pub use hash::Hasher;
pub use scheduler::{BatchScheduler, SchedulerOptions};
pub use transform::ImageTransformer;
