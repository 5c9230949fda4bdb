pub mod header;
pub mod theme;
