mod staff;

pub use staff::{Staff, StaffStatus, StaffWithStats};
