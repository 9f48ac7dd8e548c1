pub mod projection;
pub mod reference;
pub mod sensitivity;
