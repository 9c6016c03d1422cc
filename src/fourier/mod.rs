/// Frequency-domain layer: transform, selection, and serialization.
///
/// Architecture:
/// ```text
///   ImageArray
///        │
///        ▼
///   ┌────────────┐
///   │ transform   │  per-channel 2D FFT, DC centered
///   └────────────┘
///        │
///        ▼
///   ┌────────────┐     ┌──────────┐
///   │  selector   │ ──▶ │  sparse   │  FrequencyIndex → coefficients
///   └────────────┘     └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ transform⁻¹ │  real reconstruction (unclipped)
///   └────────────┘
/// ```
pub mod selector;
pub mod sparse;
pub mod transform;
