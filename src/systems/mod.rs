pub mod sdk;
pub mod catalog;
pub mod progression;
pub mod session;
#[cfg(feature = "system-shop")]
pub mod shop;
