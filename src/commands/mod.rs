pub mod align;
pub mod extend;
