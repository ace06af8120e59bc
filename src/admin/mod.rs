// Admin module
// Application moderation and the admin verification endpoint

pub mod handlers;
pub mod models;
