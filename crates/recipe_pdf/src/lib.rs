mod document;
pub mod qr;
mod text;

pub use document::PdfRecipeRenderer;
pub use qr::{QrError, QrMatrix};
