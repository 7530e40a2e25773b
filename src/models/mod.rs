pub mod company;
pub mod quote;
pub mod response;

pub use company::*;
pub use quote::*;
pub use response::*;
