pub mod face_shape;
pub mod recommendation_table;
pub mod shape_classifier;
