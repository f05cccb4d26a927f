pub mod face_checklist;
pub mod face_validator;
