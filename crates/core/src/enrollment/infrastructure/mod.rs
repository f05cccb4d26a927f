pub mod file_enrollment_store;
pub mod memory_enrollment_store;
