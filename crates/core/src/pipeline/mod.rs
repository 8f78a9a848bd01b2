pub mod detection_context;
pub mod detection_logger;
pub mod detection_loop;
pub mod infrastructure;
pub mod recommend_face_shape_use_case;
