pub mod notify;
pub mod rate;
pub mod setup;
pub mod ui;
pub mod watch;
