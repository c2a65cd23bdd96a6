mod complaint_service;

pub use complaint_service::ComplaintService;
pub(crate) use complaint_service::insert_complaint;
