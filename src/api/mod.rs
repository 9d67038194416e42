pub mod caresheet;
pub mod checkout;
pub mod client;
pub mod feedback;
pub mod logs;
pub mod pets;
pub mod routines;
pub mod users;

pub use client::{ApiClient, ApiError, USER_ID_HEADER};
