pub mod loaders;
pub mod loop_state;
pub mod question;

pub use loaders::{load_questions_file, parse_questions, recover_question_array, renumber};
pub use loop_state::LoopState;
pub use question::{Question, QuestionType};
