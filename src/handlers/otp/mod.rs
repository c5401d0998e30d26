pub mod check;
pub mod helper;
pub mod send;
pub mod verify;
