pub mod json_loader;

pub use json_loader::{load_questions_file, parse_questions, recover_question_array, renumber};
