pub mod manifest;
pub mod render;
pub mod row_scaling;
pub mod status;
pub mod summarize;
