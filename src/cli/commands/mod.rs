pub mod folders;
pub mod lists;
pub mod todos;
pub mod token;
