//! Luminance planes, training tiles, and plane upscaling.
//!
//! A [`Tile`] pairs a 2x box-downsampled source with the full-resolution target the
//! network should reconstruct. Both are `size x size`, stored row-major (`y * size + x`).

use log::debug;
use rand::Rng;

use crate::{Dataset, Error, Network, ProgressSink, Result};

/// One float image channel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Plane {
    /// A zeroed plane.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn from_data(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != width * height {
            return Err(Error::InvalidData(format!(
                "plane data length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a plane by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Panics if `(x, y)` is outside the plane.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.data[y * self.width + x] = v;
    }

    /// Cut a training pair whose downsampled source covers `[x, x + 2*size)` x
    /// `[y, y + 2*size)` and whose target starts at `(x + size/4, y + size/4)`.
    pub fn sample_tile(&self, x: usize, y: usize, size: usize) -> Result<Tile> {
        if size == 0 {
            return Err(Error::InvalidData("tile size must be > 0".to_owned()));
        }
        if x + 2 * size > self.width || y + 2 * size > self.height {
            return Err(Error::InvalidData(format!(
                "tile at ({x}, {y}) of size {size} does not fit a {}x{} plane",
                self.width, self.height
            )));
        }

        let offset = size / 4;
        let mut source = vec![0.0; size * size];
        let mut target = vec![0.0; size * size];
        for ty in 0..size {
            for tx in 0..size {
                let (sx, sy) = (x + 2 * tx, y + 2 * ty);
                let sum = self.get(sx, sy)
                    + self.get(sx + 1, sy)
                    + self.get(sx, sy + 1)
                    + self.get(sx + 1, sy + 1);
                source[ty * size + tx] = sum / 4.0;
                target[ty * size + tx] = self.get(x + offset + tx, y + offset + ty);
            }
        }

        Ok(Tile {
            source,
            target,
            size,
        })
    }
}

/// A `(source, target)` training pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub source: Vec<f32>,
    pub target: Vec<f32>,
    pub size: usize,
}

impl Dataset {
    /// Append `count` tiles sampled at uniform positions in `[2*size, side - 2*size]`.
    ///
    /// The dataset's input and target dimensions must both be `size * size`, and the
    /// plane must be at least `4 * size` on each side.
    pub fn sample_tiles<R: Rng + ?Sized>(
        &mut self,
        plane: &Plane,
        count: usize,
        size: usize,
        rng: &mut R,
    ) -> Result<()> {
        let cells = size * size;
        if size == 0 || self.input_dim() != cells || self.target_dim() != cells {
            return Err(Error::InvalidData(format!(
                "tile size {size} does not match dataset dims ({}, {})",
                self.input_dim(),
                self.target_dim()
            )));
        }
        if plane.width() < 4 * size || plane.height() < 4 * size {
            return Err(Error::InvalidData(format!(
                "plane {}x{} is too small for tiles of size {size}",
                plane.width(),
                plane.height()
            )));
        }

        let (lo, hi_x, hi_y) = (2 * size, plane.width() - 2 * size, plane.height() - 2 * size);
        for _ in 0..count {
            let x = rng.gen_range(lo..=hi_x);
            let y = rng.gen_range(lo..=hi_y);
            let tile = plane.sample_tile(x, y, size)?;
            self.push(&tile.source, &tile.target)?;
        }
        debug!("sampled {count} tiles of size {size}, dataset now holds {}", self.len());
        Ok(())
    }
}

impl Network {
    /// Upscale `plane` by 2x, one `size x size` tile at a time.
    ///
    /// `shift` is added to every input and subtracted from every output, so channels
    /// centered on zero can be fed in the network's trained range. Input and output
    /// counts must both be `size * size`. `progress` gets the fraction of output rows
    /// done after each row of tiles, with a loss of 0.
    pub fn upscale_plane<P: ProgressSink + ?Sized>(
        &self,
        plane: &Plane,
        size: usize,
        shift: f32,
        progress: &P,
    ) -> Result<Plane> {
        let cells = size * size;
        if size == 0 || self.input_count() != cells || self.output_count() != cells {
            return Err(Error::InvalidShape(format!(
                "tile size {size} does not match network {} -> {}",
                self.input_count(),
                self.output_count()
            )));
        }

        let out_w = plane.width().saturating_sub(size / 2) / size * (2 * size);
        let out_h = plane.height().saturating_sub(size / 2) / size * (2 * size);
        if out_w == 0 || out_h == 0 {
            return Err(Error::InvalidData(format!(
                "plane {}x{} is too small to upscale with tiles of size {size}",
                plane.width(),
                plane.height()
            )));
        }
        debug!(
            "upscaling {}x{} -> {out_w}x{out_h}",
            plane.width(),
            plane.height()
        );

        let mut out = Plane::new(out_w, out_h);
        let mut ws = self.working_set();
        let mut input = vec![0.0; cells];

        for y in (0..out_h).step_by(size) {
            for x in (0..out_w).step_by(size) {
                for ty in 0..size {
                    for tx in 0..size {
                        input[ty * size + tx] = plane.get(x / 2 + tx, y / 2 + ty) + shift;
                    }
                }
                ws.push_input(&input)?;
                ws.forward(self)?;

                let values = ws.output();
                for ty in 0..size {
                    for tx in 0..size {
                        out.set(x + tx, y + ty, values[ty * size + tx] - shift);
                    }
                }
            }
            progress.report((y + size) as f32 / out_h as f32, 0.0);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Activation, NoProgress};

    use parking_lot::Mutex;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ramp(w: usize, h: usize) -> Plane {
        Plane::from_fn(w, h, |x, y| (x + 100 * y) as f32)
    }

    #[test]
    fn plane_rejects_bad_data_len() {
        assert!(Plane::from_data(2, 2, vec![0.0; 3]).is_err());
        let p = Plane::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(p.get(1, 1), 4.0);
    }

    #[test]
    fn sample_tile_downsamples_and_offsets() {
        let plane = ramp(16, 16);
        let tile = plane.sample_tile(2, 4, 4).unwrap();

        // Source (0, 0) averages (2..4, 4..6).
        assert_eq!(tile.source[0], (402.0 + 403.0 + 502.0 + 503.0) / 4.0);

        // Source (1, 2) averages (4..6, 8..10).
        assert_eq!(tile.source[2 * 4 + 1], (804.0 + 805.0 + 904.0 + 905.0) / 4.0);

        // Target starts one pixel in for size 4.
        assert_eq!(tile.target[0], plane.get(3, 5));
        assert_eq!(tile.target[3 * 4 + 2], plane.get(5, 8));
    }

    #[test]
    fn sample_tile_checks_bounds() {
        let plane = ramp(8, 8);
        assert!(plane.sample_tile(0, 0, 4).is_ok());
        assert!(plane.sample_tile(1, 0, 4).is_err());
        assert!(plane.sample_tile(0, 0, 0).is_err());
    }

    #[test]
    fn dataset_sampling_fills_rows() {
        let plane = ramp(32, 32);
        let mut data = Dataset::new(16, 16).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        data.sample_tiles(&plane, 10, 4, &mut rng).unwrap();
        assert_eq!(data.len(), 10);

        let mut wrong = Dataset::new(9, 16).unwrap();
        assert!(wrong.sample_tiles(&plane, 1, 4, &mut rng).is_err());
        assert!(data.sample_tiles(&ramp(15, 32), 1, 4, &mut rng).is_err());
    }

    #[test]
    fn identity_network_upscales_by_repeating_the_source() {
        let size = 2;
        let cells = size * size;
        let mut net = Network::new(cells, cells, cells, 1, Activation::Linear, 0.0, false).unwrap();
        for i in 0..cells {
            net.hidden_layer_mut(0).unwrap()[i][i] = cells as f32;
            net.output_layer_mut()[i][i] = cells as f32;
        }

        let plane = ramp(6, 6);
        let out = net.upscale_plane(&plane, size, 0.5, &NoProgress).unwrap();
        assert_eq!((out.width(), out.height()), (8, 8));

        // Output tile at (x, y) reads the source at (x/2, y/2).
        for y in 0..out.height() {
            for x in 0..out.width() {
                let (tx, ty) = (x % size, y % size);
                let src = plane.get(x / size * size / 2 + tx, y / size * size / 2 + ty);
                assert!((out.get(x, y) - src).abs() < 1e-3, "({x}, {y})");
            }
        }
    }

    #[test]
    fn upscale_rejects_mismatched_tile_size() {
        let net = Network::new(4, 4, 4, 1, Activation::Linear, 0.0, false).unwrap();
        assert!(matches!(
            net.upscale_plane(&ramp(8, 8), 3, 0.0, &NoProgress),
            Err(Error::InvalidShape(_))
        ));
        assert!(matches!(
            net.upscale_plane(&Plane::new(0, 8), 2, 0.0, &NoProgress),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn upscale_reports_one_update_per_tile_row() {
        let net = Network::new(4, 4, 4, 1, Activation::Linear, 0.0, false).unwrap();
        let seen = Mutex::new(Vec::new());
        let out = net
            .upscale_plane(&ramp(6, 3), 2, 0.0, &|f: f32, _: f32| seen.lock().push(f))
            .unwrap();
        assert_eq!((out.width(), out.height()), (8, 4));
        assert_eq!(*seen.lock(), vec![0.5, 1.0]);
    }
}
