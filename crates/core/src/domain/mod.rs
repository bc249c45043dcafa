pub mod history;
pub mod preference;
pub mod summary;
