pub mod auto_capture_scheduler;
pub mod capture_coordinator;
pub mod domain;
pub mod frame_sampler;
pub mod infrastructure;
pub mod session;
