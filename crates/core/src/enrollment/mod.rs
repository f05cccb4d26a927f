pub mod domain;
pub mod enrollment_decision;
pub mod exchange_format;
pub mod infrastructure;
