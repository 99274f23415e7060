pub mod answer;
pub mod question_ctx;
pub mod question_flow;
pub mod timings;

pub use answer::{pick_multiple_choice_value, resolve_answer_index};
pub use question_ctx::QuestionCtx;
pub use question_flow::{ProcessResult, QuestionFlow};
pub use timings::Timings;
