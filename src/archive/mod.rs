// Sequence archive handling
// Locates archives, parses sequence identifiers, and extracts per-frame parameters

pub mod params;
pub mod reader;
pub mod sequence;

pub use params::{extract_frame_params, FrameParameters, HandParams, RawManoRecord};
pub use reader::{load_archive, ArchiveError, SequenceArchive};
pub use sequence::extract_sequence_id;
