pub mod staff_handler;

pub use staff_handler::*;
