// Quill - LinkedIn post generation with a writer/critic rewrite loop
// Library exports

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod providers;
