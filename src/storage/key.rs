// Storage keys
// (sequence_id, frame_id) forms the composite key every frame record lives under

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum KeyError {
    #[error("Sequence id is empty")]
    EmptySequenceId,

    #[error("Sequence id contains path components: {0}")]
    UnsafeSequenceId(String),

    #[error("Frame id is negative: {0}")]
    NegativeFrameId(i64),
}

/// Validated composite key for one frame record.
///
/// All storage paths derive from this type, so a key that validates can
/// never escape the storage root or produce a malformed directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    sequence_id: String,
    frame_id: i64,
}

impl FrameKey {
    pub fn new(sequence_id: &str, frame_id: i64) -> Result<Self, KeyError> {
        if sequence_id.is_empty() {
            return Err(KeyError::EmptySequenceId);
        }
        if sequence_id.contains(['/', '\\']) || sequence_id == "." || sequence_id == ".." {
            return Err(KeyError::UnsafeSequenceId(sequence_id.to_string()));
        }
        if frame_id < 0 {
            return Err(KeyError::NegativeFrameId(frame_id));
        }
        Ok(FrameKey {
            sequence_id: sequence_id.to_string(),
            frame_id,
        })
    }

    pub fn sequence_id(&self) -> &str {
        &self.sequence_id
    }

    pub fn frame_id(&self) -> i64 {
        self.frame_id
    }

    /// Directory name of the frame record under its sequence directory.
    pub fn frame_dir_name(&self) -> String {
        format!("frame_{}", self.frame_id)
    }

    /// Path of the frame record relative to the storage root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.sequence_id).join(self.frame_dir_name())
    }
}

/// Parse a frame directory name ("frame_<id>") back to its frame id.
/// Names that do not match the convention yield `None`.
pub fn parse_frame_dir_name(name: &str) -> Option<i64> {
    let id = name.strip_prefix("frame_")?;
    id.parse::<i64>().ok().filter(|frame_id| *frame_id >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_key() {
        let key = FrameKey::new("1a2b3c", 7).unwrap();
        assert_eq!(key.sequence_id(), "1a2b3c");
        assert_eq!(key.frame_id(), 7);
        assert_eq!(key.frame_dir_name(), "frame_7");
        assert_eq!(key.relative_path(), PathBuf::from("1a2b3c/frame_7"));
    }

    #[test]
    fn test_empty_sequence_id_is_rejected() {
        assert_eq!(FrameKey::new("", 0), Err(KeyError::EmptySequenceId));
    }

    #[test]
    fn test_path_separators_are_rejected() {
        assert!(matches!(
            FrameKey::new("a/b", 0),
            Err(KeyError::UnsafeSequenceId(_))
        ));
        assert!(matches!(
            FrameKey::new("..", 0),
            Err(KeyError::UnsafeSequenceId(_))
        ));
    }

    #[test]
    fn test_negative_frame_id_is_rejected() {
        assert_eq!(FrameKey::new("abc", -1), Err(KeyError::NegativeFrameId(-1)));
    }

    #[test]
    fn test_parse_frame_dir_name() {
        assert_eq!(parse_frame_dir_name("frame_42"), Some(42));
        assert_eq!(parse_frame_dir_name("frame_"), None);
        assert_eq!(parse_frame_dir_name("frame_-3"), None);
        assert_eq!(parse_frame_dir_name("summary.json"), None);
    }
}
