pub mod append_planner;
pub mod diff_detector;
pub mod error;
pub mod key_matcher;
pub mod update_planner;
