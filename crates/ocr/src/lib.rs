pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use extract::Extractor;
pub use pipeline::{DocumentPipeline, PipelineError, PipelineReport};
pub use preprocess::{prepare_page, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, TesseractRecognizer};
pub use types::ExtractedListing;
