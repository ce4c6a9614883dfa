pub mod breaking;
pub mod circular;
pub mod impact;
pub mod stats;
