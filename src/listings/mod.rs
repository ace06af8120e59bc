// Listings module
// Public service browsing and freelancer-owned service management

pub mod handlers;
pub mod models;
