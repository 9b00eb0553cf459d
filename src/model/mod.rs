pub mod entity;
pub mod page;
