pub mod catalog;
pub mod ea;
pub mod op;
pub mod reg;
