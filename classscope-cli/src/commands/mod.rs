pub mod attrs;
pub mod common;
pub mod disasm;
pub mod info;
pub mod methods;
pub mod pool;
