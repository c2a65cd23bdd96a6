mod complaint;
mod notification;

pub use complaint::{Complaint, ComplaintSeverity, ComplaintStatus};
pub use notification::{ComplaintNotification, NotificationType};
