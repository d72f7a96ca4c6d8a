pub mod attendance;
pub mod employee;
pub mod office_location;
pub mod remote_request;
pub mod role;
pub mod shift;
