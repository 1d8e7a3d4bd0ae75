pub mod courses;
pub mod learn;
pub mod review;
pub mod status;
pub mod vocab;
