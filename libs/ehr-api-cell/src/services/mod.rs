pub mod client;
pub mod practicefusion;
pub mod tebra;

pub use client::EhrHttpClient;
pub use practicefusion::PracticeFusionClient;
pub use tebra::TebraClient;
