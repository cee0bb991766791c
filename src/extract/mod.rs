pub mod oracle;
pub mod pages;
pub mod render;

pub use oracle::{OpenAiVisionClient, VisionOracle};
pub use pages::{extract_labels, extract_orders, ExtractSettings};
pub use render::{PageRenderer, PdftoppmRenderer};
