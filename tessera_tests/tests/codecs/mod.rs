pub mod compile_errors;
pub mod helpers;
pub mod properties;
pub mod scenarios;
