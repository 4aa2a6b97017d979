pub mod allocation;
pub mod assumptions;
pub mod returns;
