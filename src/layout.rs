//! Layout recipes: where a layer's particles rest.
//!
//! A layout turns per-particle draws from a [`SpawnContext`] into a rest
//! position. [`Layout::SpiralDisc`] looks at the particle index to assign
//! arms and [`Layout::Rain`] uses it to pick a column; every other recipe
//! depends on the draws alone.
//!
//! Draws consumed per particle:
//!
//! | Layout | Draws |
//! |--------|-------|
//! | `Band` | `1 + 2 * samples` (t, vertical bell, depth bell) |
//! | `SpiralDisc` | `7` (radius, then sign and magnitude per axis) |
//! | `SphereShell` | `3` (azimuth, polar, radius) |
//! | `HemisphereField` | `3` (azimuth, polar, radius) |
//! | `Cloud` | `3` (x, y, z) |
//! | `Rain` | `1` (starting row) |
//! | `Points` | `0` |

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::error::RecipeError;
use crate::rain::RainGrid;
use crate::spawn::SpawnContext;

/// Spatial distribution recipe for one layer. Y is up.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    /// A tilted band across the view with bell-shaped thickness.
    ///
    /// With `t` in `[-1, 1)`:
    /// `x = t * half_width`,
    /// `y = t * vertical_scale + spread * 8 * band_width + y_offset`,
    /// `z = spread_z * depth`, where both spreads come from [`SpawnContext::bell`].
    Band {
        half_width: f32,
        vertical_scale: f32,
        band_width: f32,
        y_offset: f32,
        depth: f32,
        /// Uniform draws averaged per bell sample (2 or 3).
        samples: u32,
    },

    /// Spiral arms in the XZ plane.
    ///
    /// Each particle belongs to arm `index % branches`. Its angle is the arm
    /// angle plus `radius * spin`; jitter is `u^power * randomness * radius`
    /// per axis so arms stay tight near the core and fray outward.
    SpiralDisc {
        branches: u32,
        min_radius: f32,
        max_radius: f32,
        spin: f32,
        randomness: f32,
        power: f32,
        /// Scale of the vertical jitter relative to the in-plane jitter.
        thickness: f32,
    },

    /// Uniform directions on a spherical shell.
    SphereShell { min_radius: f32, max_radius: f32 },

    /// Uniform directions on an upper cap of half-angle `max_polar`.
    HemisphereField {
        min_radius: f32,
        max_radius: f32,
        max_polar: f32,
    },

    /// Uniform point cloud inside an axis-aligned box.
    Cloud { half_extents: Vec3 },

    /// Drops spread over the columns of a grid, starting at staggered rows.
    ///
    /// Particle `i` falls in column `i % columns`. The drops sharing a column
    /// split its rows into equal slots and each starts somewhere in its own.
    Rain(RainGrid),

    /// Explicit rest positions, one per particle.
    Points(Vec<Vec3>),
}

impl Layout {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Layout::Band { .. } => "band",
            Layout::SpiralDisc { .. } => "spiral-disc",
            Layout::SphereShell { .. } => "sphere-shell",
            Layout::HemisphereField { .. } => "hemisphere-field",
            Layout::Cloud { .. } => "cloud",
            Layout::Rain(_) => "rain",
            Layout::Points(_) => "points",
        }
    }

    pub fn validate(&self, count: usize) -> Result<(), RecipeError> {
        match self {
            Layout::Band {
                half_width,
                vertical_scale,
                band_width,
                y_offset,
                depth,
                samples,
            } => {
                check_finite("half_width", *half_width)?;
                check_finite("vertical_scale", *vertical_scale)?;
                check_finite("band_width", *band_width)?;
                check_finite("y_offset", *y_offset)?;
                check_finite("depth", *depth)?;
                if !(2..=3).contains(samples) {
                    return Err(RecipeError::InvalidBellSamples(*samples));
                }
            }
            Layout::SpiralDisc {
                branches,
                min_radius,
                max_radius,
                spin,
                randomness,
                power,
                thickness,
            } => {
                if *branches == 0 {
                    return Err(RecipeError::NoBranches);
                }
                check_radius(*min_radius, *max_radius)?;
                check_finite("spin", *spin)?;
                check_finite("randomness", *randomness)?;
                check_finite("thickness", *thickness)?;
                // u = 0 with a non-positive power would give 0^p = inf.
                if !(power.is_finite() && *power > 0.0) {
                    return Err(RecipeError::InvalidPower(*power));
                }
            }
            Layout::SphereShell {
                min_radius,
                max_radius,
            } => check_radius(*min_radius, *max_radius)?,
            Layout::HemisphereField {
                min_radius,
                max_radius,
                max_polar,
            } => {
                check_radius(*min_radius, *max_radius)?;
                if !(*max_polar > 0.0 && *max_polar <= PI) {
                    return Err(RecipeError::InvalidCapAngle(*max_polar));
                }
            }
            Layout::Cloud { half_extents } => {
                check_finite("half_extents.x", half_extents.x)?;
                check_finite("half_extents.y", half_extents.y)?;
                check_finite("half_extents.z", half_extents.z)?;
            }
            Layout::Rain(grid) => grid.validate()?,
            Layout::Points(points) => {
                if points.len() != count {
                    return Err(RecipeError::PointCountMismatch {
                        expected: count,
                        actual: points.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Rest position for the particle described by `ctx`.
    pub fn place(&self, ctx: &mut SpawnContext<'_>) -> Vec3 {
        match self {
            Layout::Band {
                half_width,
                vertical_scale,
                band_width,
                y_offset,
                depth,
                samples,
            } => {
                let t = ctx.signed_unit();
                let spread = ctx.bell(*samples);
                let spread_z = ctx.bell(*samples);
                Vec3::new(
                    t * half_width,
                    t * vertical_scale + spread * 8.0 * band_width + y_offset,
                    spread_z * depth,
                )
            }
            Layout::SpiralDisc {
                branches,
                min_radius,
                max_radius,
                spin,
                randomness,
                power,
                thickness,
            } => {
                let radius = ctx.random_range(*min_radius, *max_radius);
                let branch = (ctx.index % *branches as usize) as f32;
                let angle = branch / *branches as f32 * TAU + radius * spin;

                let jx = ctx.jitter(*power, *randomness, radius);
                let jy = ctx.jitter(*power, *randomness, radius) * thickness;
                let jz = ctx.jitter(*power, *randomness, radius);

                Vec3::new(angle.cos() * radius + jx, jy, angle.sin() * radius + jz)
            }
            Layout::SphereShell {
                min_radius,
                max_radius,
            } => {
                let theta = ctx.azimuth();
                let phi = ctx.polar();
                let radius = ctx.random_range(*min_radius, *max_radius);
                spherical(radius, theta, phi)
            }
            Layout::HemisphereField {
                min_radius,
                max_radius,
                max_polar,
            } => {
                let theta = ctx.azimuth();
                let phi = ctx.cap_polar(*max_polar);
                let radius = ctx.random_range(*min_radius, *max_radius);
                spherical(radius, theta, phi)
            }
            Layout::Cloud { half_extents } => {
                let x = ctx.signed_unit();
                let y = ctx.signed_unit();
                let z = ctx.signed_unit();
                Vec3::new(x, y, z) * *half_extents
            }
            Layout::Rain(grid) => {
                let columns = grid.columns.max(1) as usize;
                let rows = grid.rows.max(1);
                let column = (ctx.index % columns) as u32;
                let slot = ctx.index / columns;
                let per_column = ctx.count.div_ceil(columns).max(1);
                let start = (slot as f32 + ctx.random()) / per_column as f32;
                let row = 1 + ((start * rows as f32) as u32).min(rows - 1);
                Vec3::new(grid.column_x(column), grid.row_y(row), 0.0)
            }
            // Out-of-range indices only occur when `validate` was skipped.
            Layout::Points(points) => points.get(ctx.index).copied().unwrap_or(Vec3::ZERO),
        }
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<(), RecipeError> {
    if !value.is_finite() {
        return Err(RecipeError::NonFinite { field, value });
    }
    Ok(())
}

fn check_radius(min: f32, max: f32) -> Result<(), RecipeError> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
        return Err(RecipeError::InvalidRadius { min, max });
    }
    Ok(())
}

/// Spherical to cartesian with `phi` measured from +Y.
fn spherical(radius: f32, theta: f32, phi: f32) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(
        radius * sin_phi * theta.cos(),
        radius * cos_phi,
        radius * sin_phi * theta.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::{ScriptedSource, SeededSource};
    use std::f32::consts::FRAC_PI_3;

    fn place_all(layout: &Layout, count: usize, seed: u64) -> Vec<Vec3> {
        let mut source = SeededSource::new(seed);
        (0..count)
            .map(|i| layout.place(&mut SpawnContext::new(i, count, &mut source)))
            .collect()
    }

    #[test]
    fn test_band_formula() {
        let layout = Layout::Band {
            half_width: 40.0,
            vertical_scale: 5.0,
            band_width: 1.5,
            y_offset: 2.0,
            depth: 10.0,
            samples: 2,
        };
        // t = 0.5, vertical spread = (0.8 + 0.6) / 2 - 0.5 = 0.2, depth spread = 0.
        let mut source = ScriptedSource::new(vec![0.75, 0.8, 0.6, 0.5, 0.5]);
        let p = layout.place(&mut SpawnContext::new(0, 1, &mut source));
        assert!((p.x - 20.0).abs() < 1e-4);
        assert!((p.y - (0.5 * 5.0 + 0.2 * 8.0 * 1.5 + 2.0)).abs() < 1e-4);
        assert!(p.z.abs() < 1e-4);
        assert_eq!(source.drawn(), 5);
    }

    #[test]
    fn test_sphere_shell_radius_bounds() {
        let layout = Layout::SphereShell {
            min_radius: 30.0,
            max_radius: 60.0,
        };
        for p in place_all(&layout, 500, 4) {
            let r = p.length();
            assert!((30.0 - 1e-3..=60.0 + 1e-3).contains(&r));
        }
    }

    #[test]
    fn test_sphere_shell_covers_both_hemispheres() {
        let layout = Layout::SphereShell {
            min_radius: 1.0,
            max_radius: 1.0,
        };
        let points = place_all(&layout, 1000, 8);
        let upper = points.iter().filter(|p| p.y > 0.0).count();
        assert!((400..600).contains(&upper));
    }

    #[test]
    fn test_hemisphere_stays_inside_cap() {
        let layout = Layout::HemisphereField {
            min_radius: 50.0,
            max_radius: 80.0,
            max_polar: FRAC_PI_3,
        };
        for p in place_all(&layout, 500, 9) {
            let cos_phi = p.y / p.length();
            assert!(cos_phi >= FRAC_PI_3.cos() - 1e-4);
        }
    }

    #[test]
    fn test_spiral_without_jitter_sits_on_arms() {
        let layout = Layout::SpiralDisc {
            branches: 3,
            min_radius: 1.0,
            max_radius: 5.0,
            spin: 0.0,
            randomness: 0.0,
            power: 3.0,
            thickness: 0.5,
        };
        for (i, p) in place_all(&layout, 30, 2).iter().enumerate() {
            let expected = (i % 3) as f32 / 3.0 * TAU;
            let angle = p.z.atan2(p.x).rem_euclid(TAU);
            let diff = (angle - expected).abs();
            assert!(diff < 1e-3 || (TAU - diff) < 1e-3);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_cloud_bounds() {
        let half = Vec3::new(10.0, 5.0, 2.0);
        for p in place_all(&Layout::Cloud { half_extents: half }, 300, 1) {
            assert!(p.abs().cmple(half).all());
        }
    }

    #[test]
    fn test_points_returns_explicit_positions() {
        let layout = Layout::Points(vec![Vec3::X, Vec3::Y]);
        assert_eq!(place_all(&layout, 2, 0), vec![Vec3::X, Vec3::Y]);
    }

    #[test]
    fn test_points_past_the_end_fall_back_to_origin() {
        let layout = Layout::Points(vec![Vec3::X]);
        assert_eq!(place_all(&layout, 3, 0), vec![Vec3::X, Vec3::ZERO, Vec3::ZERO]);
    }

    #[test]
    fn test_rain_fills_columns_with_staggered_rows() {
        let grid = RainGrid::new(4, 20, 1.0);
        let layout = Layout::Rain(grid);
        let points = place_all(&layout, 12, 6);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.x, grid.column_x((i % 4) as u32));
            assert_eq!(p.z, 0.0);
            let row = grid.row_at(p.y);
            assert!((1..=20).contains(&row));
            // Three drops per column, each inside its own third of the rows.
            let slot = (i / 4) as u32;
            assert!(row > slot * 20 / 3 && row <= (slot + 1) * 20 / 3 + 1);
        }
    }

    #[test]
    fn test_validation() {
        let band = Layout::Band {
            half_width: 1.0,
            vertical_scale: 0.0,
            band_width: 1.0,
            y_offset: 0.0,
            depth: 0.0,
            samples: 5,
        };
        assert_eq!(band.validate(10), Err(RecipeError::InvalidBellSamples(5)));
        assert_eq!(
            Layout::Points(vec![Vec3::ZERO]).validate(2),
            Err(RecipeError::PointCountMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            Layout::SphereShell {
                min_radius: 5.0,
                max_radius: 1.0
            }
            .validate(1),
            Err(RecipeError::InvalidRadius { .. })
        ));
        assert!(matches!(
            Layout::HemisphereField {
                min_radius: 1.0,
                max_radius: 2.0,
                max_polar: 0.0
            }
            .validate(1),
            Err(RecipeError::InvalidCapAngle(_))
        ));
        assert_eq!(
            Layout::Rain(RainGrid::new(0, 10, 1.0)).validate(1),
            Err(RecipeError::InvalidRainGrid {
                columns: 0,
                rows: 10,
                cell: 1.0
            })
        );
    }

    #[test]
    fn test_validation_rejects_non_finite_band() {
        let band = Layout::Band {
            half_width: f32::NAN,
            vertical_scale: 0.0,
            band_width: 1.0,
            y_offset: 0.0,
            depth: 0.0,
            samples: 2,
        };
        assert!(matches!(
            band.validate(1),
            Err(RecipeError::NonFinite {
                field: "half_width",
                ..
            })
        ));
        let band = Layout::Band {
            half_width: 1.0,
            vertical_scale: 0.0,
            band_width: 1.0,
            y_offset: 0.0,
            depth: f32::INFINITY,
            samples: 2,
        };
        assert!(matches!(
            band.validate(1),
            Err(RecipeError::NonFinite { field: "depth", .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_spiral_jitter() {
        let spiral = |power: f32, spin: f32| Layout::SpiralDisc {
            branches: 2,
            min_radius: 0.0,
            max_radius: 5.0,
            spin,
            randomness: 0.3,
            power,
            thickness: 0.5,
        };
        assert_eq!(spiral(-2.0, 0.5).validate(1), Err(RecipeError::InvalidPower(-2.0)));
        assert_eq!(spiral(0.0, 0.5).validate(1), Err(RecipeError::InvalidPower(0.0)));
        assert!(matches!(
            spiral(3.0, f32::NAN).validate(1),
            Err(RecipeError::NonFinite { field: "spin", .. })
        ));
        assert!(spiral(3.0, 0.5).validate(1).is_ok());
    }

    #[test]
    fn test_validation_rejects_non_finite_cloud() {
        let cloud = Layout::Cloud {
            half_extents: Vec3::new(1.0, f32::INFINITY, 1.0),
        };
        assert!(matches!(
            cloud.validate(1),
            Err(RecipeError::NonFinite {
                field: "half_extents.y",
                ..
            })
        ));
    }
}
