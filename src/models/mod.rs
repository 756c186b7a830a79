pub mod fitting;
pub mod garment;
pub mod job;
