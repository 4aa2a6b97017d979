pub mod bands;
pub mod statistics;
