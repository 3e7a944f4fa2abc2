pub mod clock;
pub mod hash;
pub mod jwt;
pub mod lookup;
pub mod page;
pub mod scope;
