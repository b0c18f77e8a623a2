pub mod seed;
pub mod show;
pub mod sync;
