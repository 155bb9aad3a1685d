// Ensemble stage: statistical voting, the external inference boundary, and
// the combiner that merges both under the active risk profile.
pub mod combiner;
pub mod inference;
pub mod prompt;
pub mod statistical;

pub use combiner::{combine, CombineOutcome};
pub use inference::{extract_opinion, ExternalOpinion, InferenceProvider};
pub use prompt::{build_prompt, PromptContext};
