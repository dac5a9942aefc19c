pub mod alloc;
pub mod error;
pub mod option;
pub mod result;
