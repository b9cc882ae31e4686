pub mod interface;
pub mod rekognition;

pub use interface::{LabelDetector, LabelItem};
pub use rekognition::RekognitionLabelDetector;
