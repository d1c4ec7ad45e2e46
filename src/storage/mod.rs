// Frame-indexed on-disk storage
// Composite keys, the summary manifest, the frame writer, and the hierarchy walker

pub mod key;
pub mod manifest;
pub mod reader;
pub mod writer;

pub use key::{parse_frame_dir_name, FrameKey, KeyError};
pub use manifest::{AvailableData, DataKind, FrameSummary, SUMMARY_FILE};
pub use reader::DataRoot;
pub use writer::{write_frame, StorageError, StorageResult};
