pub mod capture;
pub mod detection;
pub mod enrollment;
pub mod pipeline;
pub mod shared;
pub mod validation;
