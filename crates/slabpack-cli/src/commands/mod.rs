pub mod generate;
pub mod molecules;
pub mod slab;
