pub mod enrollment_store;
