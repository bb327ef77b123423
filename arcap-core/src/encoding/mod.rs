pub mod raw_frame;
