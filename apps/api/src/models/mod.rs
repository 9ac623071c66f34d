pub mod persona;
pub mod session;
