pub mod export;
pub mod font;
pub mod hit;
pub mod loader;
pub mod paint;

pub use export::{Composition, CompositionExporter, ExportConfig, ExportError, ExportTicket};
pub use font::GlyphMetrics;
pub use hit::{hit_test, hit_test_all};
pub use loader::{FsImageLoader, ImageLoader, MemoryImageLoader};
