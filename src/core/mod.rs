// Core pipeline exports
pub mod batch;
pub mod normalize;
pub mod persist;
pub mod prompt;

pub use batch::{wave_count, BatchOutcome, BatchRunner, EvalError, ItemFailure};
pub use normalize::{strip_json_fences, NormalizeError};
pub use prompt::{truncate_chars, EvaluationPrompt, OutputSchema, PromptBuilder, NOT_PROVIDED};
