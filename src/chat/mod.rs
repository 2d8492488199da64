pub mod loop_;
pub mod prompt;

pub use loop_::{render_arguments, ChatLoop, EXAMPLE_QUERY, SEPARATOR, USER_PROMPT};
pub use prompt::PromptTemplate;
