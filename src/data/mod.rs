/// Data layer: core types, ingestion, and materialization.
///
/// Architecture:
/// ```text
///  .png / .jpg / in-memory array
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode + normalize → ImageArray
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  ImageArray   │  (rows, cols, channels) f64 raster
///   └──────────────┘
///        │  (fourier layer: transform / select / serialize)
///        ▼
///   ┌──────────┐
///   │  writer   │  clip + quantize → .png
///   └──────────┘
/// ```
pub mod loader;
pub mod model;
pub mod writer;
