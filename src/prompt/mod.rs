// Declare submodules
mod analysis;
mod common;
mod summarization;

pub use analysis::{analysis_dimensions, analysis_prompt};
pub use common::*;
pub use summarization::{summary_advice_prompt, SUMMARY_CHAR_LIMIT};
