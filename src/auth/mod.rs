pub mod authorization;
pub mod password;
