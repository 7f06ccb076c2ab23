pub mod raster;
pub mod writer;

pub use raster::{MockRasterizer, PdfRasterizer, PopplerRasterizer, RenderError};
pub use writer::{export_file_name, save_pdf, write_pdf, PdfWriteError};
