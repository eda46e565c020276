pub mod client;
pub mod error;
pub mod extract;
mod jsonld;
mod seo;

pub use client::PdpClient;
pub use error::{ErrorReport, PdpError};
pub use extract::extract_from_html;
