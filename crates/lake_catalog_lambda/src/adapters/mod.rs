pub mod access_control;
pub mod catalog;
pub mod publisher;
pub mod response_sender;
