pub mod admin;
pub mod auth;
pub mod complaints;
pub mod feedback;
pub mod staff;
