// Messages module
// Direct messaging between users: threads, conversations, read state

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

pub use error::MessageError;
pub use models::Message;
pub use repository::MessageRepository;
