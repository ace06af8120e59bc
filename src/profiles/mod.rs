// Profiles module
// Own-profile management, freelancer applications, and public profiles

pub mod handlers;
pub mod models;
