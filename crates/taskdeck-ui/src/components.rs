mod loader;
mod task_form;
mod task_list;
mod task_list_row;
mod toast_stack;
mod token_prompt;

pub use loader::Loader;
pub use task_form::TaskFormPage;
pub use task_list::TaskListPage;
pub use task_list_row::TaskListRow;
pub use toast_stack::ToastStack;
pub use token_prompt::TokenPrompt;
