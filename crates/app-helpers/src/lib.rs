pub mod dirs;
pub mod fs;
pub mod time;
