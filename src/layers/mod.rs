pub mod base;
pub mod circle;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod route_line;
pub mod tile;
