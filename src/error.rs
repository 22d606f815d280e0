//! Error types for the particle field.
//!
//! Recipe validation is the only failure a caller normally sees. Missing
//! surfaces are not errors: the driver simply stays idle.

use std::fmt;

use glam::Vec3;

/// Reasons a [`LayerRecipe`](crate::LayerRecipe) is rejected at generation time.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeError {
    /// Particle count was zero.
    EmptyLayer,
    /// `Layout::Points` was given a different number of points than `count`.
    PointCountMismatch { expected: usize, actual: usize },
    /// Palette has no entries.
    EmptyPalette,
    /// A palette weight is negative or not finite.
    InvalidWeight { index: usize, weight: f32 },
    /// Every palette weight is zero, so nothing can be picked.
    ZeroTotalWeight,
    /// A palette or flash color has a channel outside `[0, 1]`.
    ColorOutOfRange { index: usize, color: Vec3 },
    /// Flash probability outside `[0, 1]`.
    InvalidFlashProbability(f32),
    /// Brightness jitter range is inverted, negative or not finite.
    InvalidBrightness { min: f32, max: f32 },
    /// Size range is inverted, negative or not finite.
    InvalidSizeRange { min: f32, max: f32 },
    /// A radius range is inverted, negative or not finite.
    InvalidRadius { min: f32, max: f32 },
    /// Spiral disc with zero branches.
    NoBranches,
    /// Band bell-curve sample count must be 2 or 3.
    InvalidBellSamples(u32),
    /// Hemisphere cap angle outside `(0, PI]`.
    InvalidCapAngle(f32),
    /// Damping must lie in `(0, 1)`.
    InvalidDamping(f32),
    /// Relax rate must lie in `(0, 1)`.
    InvalidRelaxRate(f32),
    /// Attraction or impulse radius must be positive and finite.
    InvalidForceRadius(f32),
    /// Twinkle levels would leave `[0, 1]`.
    TwinkleOutOfRange { base_level: f32, amplitude: f32 },
    /// Twinkle frequency range is inverted, negative or not finite.
    InvalidTwinkleFrequency { min: f32, max: f32 },
    /// Layer opacity outside `[0, 1]`.
    InvalidOpacity(f32),
    /// A layout or force parameter is NaN or infinite.
    NonFinite { field: &'static str, value: f32 },
    /// Spiral jitter exponent must be positive.
    InvalidPower(f32),
    /// Rain grid needs at least one column and row and a positive cell size.
    InvalidRainGrid { columns: u32, rows: u32, cell: f32 },
    /// Rain reset chance outside `[0, 1]`.
    InvalidResetChance(f32),
    /// Rain `ticks_per_row` was zero.
    ZeroRainInterval,
    /// Falling motion was requested for a layout other than `Layout::Rain`.
    RainWithoutGrid,
}

impl fmt::Display for RecipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeError::EmptyLayer => write!(f, "Layer must contain at least one particle"),
            RecipeError::PointCountMismatch { expected, actual } => write!(
                f,
                "Point layout has {} points but the layer count is {}",
                actual, expected
            ),
            RecipeError::EmptyPalette => write!(f, "Palette has no colors"),
            RecipeError::InvalidWeight { index, weight } => {
                write!(f, "Palette entry {} has invalid weight {}", index, weight)
            }
            RecipeError::ZeroTotalWeight => write!(f, "Palette weights sum to zero"),
            RecipeError::ColorOutOfRange { index, color } => write!(
                f,
                "Palette color {} is outside [0, 1]: {:?}",
                index, color
            ),
            RecipeError::InvalidFlashProbability(p) => {
                write!(f, "Flash probability {} is outside [0, 1]", p)
            }
            RecipeError::InvalidBrightness { min, max } => {
                write!(f, "Invalid brightness range {}..{}", min, max)
            }
            RecipeError::InvalidSizeRange { min, max } => {
                write!(f, "Invalid size range {}..{}", min, max)
            }
            RecipeError::InvalidRadius { min, max } => {
                write!(f, "Invalid radius range {}..{}", min, max)
            }
            RecipeError::NoBranches => write!(f, "Spiral disc needs at least one branch"),
            RecipeError::InvalidBellSamples(n) => {
                write!(f, "Bell curve needs 2 or 3 samples, got {}", n)
            }
            RecipeError::InvalidCapAngle(a) => {
                write!(f, "Hemisphere cap angle {} is outside (0, PI]", a)
            }
            RecipeError::InvalidDamping(d) => write!(f, "Damping {} is outside (0, 1)", d),
            RecipeError::InvalidRelaxRate(r) => write!(f, "Relax rate {} is outside (0, 1)", r),
            RecipeError::InvalidForceRadius(r) => {
                write!(f, "Force radius {} must be positive", r)
            }
            RecipeError::TwinkleOutOfRange {
                base_level,
                amplitude,
            } => write!(
                f,
                "Twinkle base {} with amplitude {} leaves [0, 1]",
                base_level, amplitude
            ),
            RecipeError::InvalidTwinkleFrequency { min, max } => {
                write!(f, "Invalid twinkle frequency range {}..{}", min, max)
            }
            RecipeError::InvalidOpacity(o) => write!(f, "Opacity {} is outside [0, 1]", o),
            RecipeError::NonFinite { field, value } => {
                write!(f, "{} must be finite, got {}", field, value)
            }
            RecipeError::InvalidPower(p) => write!(f, "Jitter power {} must be positive", p),
            RecipeError::InvalidRainGrid {
                columns,
                rows,
                cell,
            } => write!(
                f,
                "Invalid rain grid: {} columns, {} rows, cell {}",
                columns, rows, cell
            ),
            RecipeError::InvalidResetChance(p) => {
                write!(f, "Rain reset chance {} is outside [0, 1]", p)
            }
            RecipeError::ZeroRainInterval => write!(f, "Rain ticks per row must be at least 1"),
            RecipeError::RainWithoutGrid => write!(f, "Falling motion needs a rain layout"),
        }
    }
}

impl std::error::Error for RecipeError {}

/// Errors produced while assembling a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A layer recipe failed validation.
    InvalidRecipe { layer: String, source: RecipeError },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InvalidRecipe { layer, source } => {
                write!(f, "Invalid recipe for layer '{}': {}", layer, source)
            }
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::InvalidRecipe { source, .. } => Some(source),
        }
    }
}

/// Errors that can occur during GPU initialization.
#[cfg(feature = "gpu")]
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    NoSurfaceFormat,
}

#[cfg(feature = "gpu")]
impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found"),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::NoSurfaceFormat => write!(f, "Surface exposes no texture formats"),
        }
    }
}

#[cfg(feature = "gpu")]
impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "gpu")]
impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

#[cfg(feature = "gpu")]
impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}
