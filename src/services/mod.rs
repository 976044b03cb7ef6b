pub mod notify;
pub mod store;
pub mod trips;
