//! A from-scratch dense network for tile-based image super-resolution.
//!
//! `tile-scaler` trains a fully-connected network to turn a 2x-downsampled `size x size`
//! tile of a luminance plane back into the full-resolution tile, then upscales whole
//! planes tile by tile.
//!
//! # Design goals
//!
//! - One network, many workers: per-thread [`NetworkWorkingSet`]s run forward and
//!   backward against `&Network` and feed their signals back under per-layer locks.
//! - The borrow checker orders a batch: averaging, updating and clearing take
//!   `&mut Network`, so they cannot overlap a worker pass.
//! - Clear contracts: shapes are validated at the API boundary and bindings between a
//!   working set and its network are checked on every pass.
//!
//! # Panics vs `Result`
//!
//! - Low-level kernels ([`dot::dot`], [`Network::forward`], [`Network::backward`],
//!   [`Network::update_weights`]) assume valid shapes and panic on misuse.
//! - Everything that takes caller data ([`Network::push_input`], the working set
//!   passes, training and persistence) validates and returns [`Result`].
//!
//! # Data layout
//!
//! - Scalars are `f32`.
//! - Layer weights are row-major with shape `(neuron_count, prev_count)`; every neuron
//!   of a layer shares one bias.
//! - [`Dataset`] stores samples contiguously, row-major.
//!
//! # Quick start
//!
//! ```rust
//! use tile_scaler::{Activation, Dataset, FitConfig, NetworkBuilder, NoProgress, Plane, Shuffle};
//! use rand::SeedableRng;
//!
//! # fn main() -> tile_scaler::Result<()> {
//! let plane = Plane::from_fn(64, 64, |x, y| ((x * 7 + y * 3) % 16) as f32 / 16.0);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//!
//! let mut train = Dataset::new(16, 16)?;
//! train.sample_tiles(&plane, 64, 4, &mut rng)?;
//!
//! let mut net = NetworkBuilder::new(16, 16)?
//!     .hidden_layers(32, 1)?
//!     .activation(Activation::LeakyReLU)
//!     .init_range(-0.9, 0.9)?
//!     .build_with_seed(0)?;
//!
//! let report = net.fit_batched(
//!     &train,
//!     FitConfig {
//!         epochs: 2,
//!         learning_rate: 0.01,
//!         batch_size: 8,
//!         threads: 2,
//!         shuffle: Shuffle::Seeded(0),
//!         ..FitConfig::default()
//!     },
//!     &NoProgress,
//! )?;
//! assert!(report.final_loss.is_finite());
//!
//! let upscaled = net.upscale_plane(&plane, 4, 0.0, &NoProgress)?;
//! assert_eq!(upscaled.width(), 120);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod data;
pub mod dot;
pub mod error;
pub mod layer;
pub mod loss;
pub mod network;
pub mod progress;
pub(crate) mod propagate;
pub mod tiles;
pub mod train;
pub mod working_set;

#[cfg(feature = "serde")]
pub mod model;

pub use activation::Activation;
pub use builder::NetworkBuilder;
pub use data::Dataset;
pub use error::{Error, Result};
pub use layer::{Layer, Signals};
pub use network::{LayerSlot, Network, NetworkId};
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use propagate::softmax;
pub use tiles::{Plane, Tile};
pub use train::{EpochReport, FitConfig, FitReport, Shuffle};
pub use working_set::{LayerWorkingSet, NetworkWorkingSet};
