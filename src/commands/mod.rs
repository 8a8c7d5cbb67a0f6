pub mod receipts;
pub mod session;
pub mod upload;
