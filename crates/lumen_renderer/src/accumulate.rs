//! Running per-pixel radiance sums.

use crate::error::alloc_buffer;
use crate::{Color, PathState, RenderError};
use rayon::prelude::*;

/// Image-sized running sum of path colors across iterations.
#[derive(Debug, Clone)]
pub struct Accumulator {
    width: u32,
    height: u32,
    sums: Vec<Color>,
    iterations: u32,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            sums: alloc_buffer("accumulator", len, Color::ZERO)?,
            iterations: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw sums in row-major pixel order.
    pub fn pixels(&self) -> &[Color] {
        &self.sums
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.sums[y as usize * self.width as usize + x as usize]
    }

    /// Number of iterations folded into the sums.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn reset(&mut self) {
        self.sums.fill(Color::ZERO);
        self.iterations = 0;
    }

    /// Average over iterations, scaled and clamped to 8-bit RGBA.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let scale = if self.iterations == 0 {
            0.0
        } else {
            255.0 / self.iterations as f32
        };
        let to_byte = |v: f32| (v * scale).clamp(0.0, 255.0) as u8;

        let texels: Vec<[u8; 4]> = self
            .sums
            .par_iter()
            .map(|c| [to_byte(c.x), to_byte(c.y), to_byte(c.z), 255])
            .collect();
        bytemuck::cast_slice::<[u8; 4], u8>(&texels).to_vec()
    }
}

/// Fold one iteration's paths into the accumulator.
///
/// Every path in the arena contributes, live or not. Non-finite colors are
/// counted and replaced by zero. Returns the number replaced.
pub fn accumulate(paths: &[PathState], pixel_scratch: &mut [Color], acc: &mut Accumulator) -> usize {
    debug_assert_eq!(pixel_scratch.len(), acc.sums.len());

    let mut sanitized = 0;
    for path in paths {
        let color = if path.color.is_finite() {
            path.color
        } else {
            sanitized += 1;
            Color::ZERO
        };
        pixel_scratch[path.pixel_index as usize] = color;
    }

    acc.sums
        .par_iter_mut()
        .zip(pixel_scratch.par_iter())
        .for_each(|(sum, &color)| *sum += color);
    acc.iterations += 1;

    if sanitized > 0 {
        log::warn!("Replaced {} non-finite path colors with black", sanitized);
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Ray;

    fn paths_with(colors: &[Color]) -> Vec<PathState> {
        colors
            .iter()
            .enumerate()
            .map(|(i, &color)| {
                let mut p = PathState::new(Ray::default(), i as u32, 0);
                p.color = color;
                p.terminate();
                p
            })
            .collect()
    }

    #[test]
    fn test_accumulate_by_pixel_index() {
        let mut acc = Accumulator::new(2, 1).unwrap();
        let mut scratch = vec![Color::ZERO; 2];

        // Arena order differs from pixel order
        let mut paths = paths_with(&[Color::splat(1.0), Color::splat(2.0)]);
        paths.swap(0, 1);

        accumulate(&paths, &mut scratch, &mut acc);
        accumulate(&paths, &mut scratch, &mut acc);

        assert_eq!(acc.iterations(), 2);
        assert_eq!(acc.get(0, 0), Color::splat(2.0));
        assert_eq!(acc.get(1, 0), Color::splat(4.0));
    }

    #[test]
    fn test_non_finite_colors_are_dropped() {
        let mut acc = Accumulator::new(3, 1).unwrap();
        let mut scratch = vec![Color::ZERO; 3];
        let paths = paths_with(&[
            Color::new(f32::NAN, 0.0, 0.0),
            Color::splat(f32::INFINITY),
            Color::ONE,
        ]);

        assert_eq!(accumulate(&paths, &mut scratch, &mut acc), 2);
        assert_eq!(acc.pixels(), &[Color::ZERO, Color::ZERO, Color::ONE]);
    }

    #[test]
    fn test_to_rgba8() {
        let mut acc = Accumulator::new(2, 1).unwrap();
        assert_eq!(acc.to_rgba8(), vec![0, 0, 0, 255, 0, 0, 0, 255]);

        let mut scratch = vec![Color::ZERO; 2];
        let paths = paths_with(&[Color::new(0.5, 5.0, -1.0), Color::ONE]);
        accumulate(&paths, &mut scratch, &mut acc);
        accumulate(&paths, &mut scratch, &mut acc);

        assert_eq!(acc.to_rgba8(), vec![127, 255, 0, 255, 255, 255, 255, 255]);

        acc.reset();
        assert_eq!(acc.iterations(), 0);
        assert_eq!(acc.pixels(), &[Color::ZERO; 2]);
    }
}
