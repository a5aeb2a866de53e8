pub mod extract;
pub mod relief;
