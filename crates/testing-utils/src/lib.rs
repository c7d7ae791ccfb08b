pub mod bin;
pub mod fake_brew;
