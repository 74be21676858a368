pub mod stats;
pub mod view;
