pub mod auth_handler;

pub use auth_handler::{__path_login, login};
