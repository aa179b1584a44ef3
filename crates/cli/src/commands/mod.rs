pub mod chat;
pub mod doctor;
pub mod memory;
pub mod onboard;
pub mod todos;
