mod concurrent;
pub mod digital;
