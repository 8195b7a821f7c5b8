pub mod conflict;
pub mod enumeration;
pub mod statistics;
