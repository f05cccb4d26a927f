pub mod sidecar_face_detector;
