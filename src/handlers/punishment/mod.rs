pub mod available;
pub mod helper;
pub mod history;
pub mod revoke;
pub mod suspend;
