use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use tile_scaler::{Activation, Dataset, FitConfig, LogProgress, NetworkBuilder, Plane, Shuffle};

const TILE: usize = 8;

/// Smooth synthetic luminance with some high-frequency detail.
fn synthetic_plane(width: usize, height: usize) -> Plane {
    Plane::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f32 / width as f32, y as f32 / height as f32);
        let base = 0.5 + 0.25 * (fx * 9.0).sin() * (fy * 7.0).cos();
        let detail = if (x / 3 + y / 5) % 2 == 0 { 0.1 } else { -0.1 };
        (base + detail).clamp(0.0, 1.0)
    })
}

fn main() -> tile_scaler::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let plane = synthetic_plane(256, 256);
    let mut rng = StdRng::seed_from_u64(0);

    let cells = TILE * TILE;
    let mut train = Dataset::new(cells, cells)?;
    train.sample_tiles(&plane, 4000, TILE, &mut rng)?;
    info!("sampled {} training tiles", train.len());

    let mut net = NetworkBuilder::new(cells, cells)?
        .hidden_layers(128, 1)?
        .activation(Activation::LeakyReLU)
        .init_range(-0.9, 0.9)?
        .build_with_rng(&mut rng)?;

    let report = net.fit_batched(
        &train,
        FitConfig {
            epochs: 3,
            learning_rate: 0.05,
            batch_size: 16,
            threads: 0,
            shuffle: Shuffle::Seeded(1),
            report_interval: 1000,
        },
        &LogProgress,
    )?;
    info!("final loss {:.6}", report.final_loss);

    let upscaled = net.upscale_plane(&plane, TILE, 0.0, &LogProgress)?;
    info!(
        "upscaled {}x{} -> {}x{}",
        plane.width(),
        plane.height(),
        upscaled.width(),
        upscaled.height()
    );

    #[cfg(feature = "serde")]
    {
        let path = std::env::temp_dir().join("tile_scaler_network.json");
        net.save_json(&path)?;
        info!("saved network to {}", path.display());
    }

    Ok(())
}
