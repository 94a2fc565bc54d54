pub mod swap;
pub mod tick;
