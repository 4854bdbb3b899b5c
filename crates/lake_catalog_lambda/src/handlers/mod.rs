pub mod dead_letter;
pub mod grants;
pub mod partition;
