pub mod assets;
pub mod events;
pub mod logs;
pub mod transactions;
