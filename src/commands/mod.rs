pub mod diff_headless;
pub mod info;
