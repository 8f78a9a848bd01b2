pub mod threaded_detection_loop;
