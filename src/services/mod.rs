pub mod auth;
pub mod input_guard;
pub mod object_id;
pub mod password;
