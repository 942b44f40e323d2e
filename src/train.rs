//! Training loops.
//!
//! - [`Network::fit`]: single-threaded online training, one update per sample.
//! - [`Network::fit_batched`]: mini-batches split across a `rayon` pool. Every worker
//!   owns a [`NetworkWorkingSet`] and feeds its signals back into the network; the
//!   coordinating thread then averages, updates, and clears.
//!
//! With `batch_size == 1` the two loops perform the same arithmetic, so given the same
//! shuffle seed they produce the same weights and losses.

use log::{debug, info, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::{Dataset, Error, Network, NetworkWorkingSet, ProgressSink, Result};

/// Sample order between epochs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shuffle {
    /// Dataset order every epoch.
    None,
    /// Fresh entropy per run.
    #[default]
    Random,
    Seeded(u64),
}

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    /// Samples per weight update. Ignored by [`Network::fit`].
    pub batch_size: usize,
    /// Worker threads; 0 uses rayon's default.
    pub threads: usize,
    pub shuffle: Shuffle,
    /// Report progress every this many samples.
    pub report_interval: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 1,
            learning_rate: 1e-2,
            batch_size: 1,
            threads: 0,
            shuffle: Shuffle::Random,
            report_interval: 2000,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(Error::InvalidConfig(
                "learning_rate must be finite and >= 0".to_owned(),
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        if self.report_interval == 0 {
            return Err(Error::InvalidConfig(
                "report_interval must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-based.
    pub epoch: usize,
    /// Mean per-sample loss seen while training this epoch.
    pub train_loss: f32,
    /// Mean per-sample loss over the dataset after the epoch's updates.
    pub loss: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub epochs: Vec<EpochReport>,
    pub final_loss: f32,
}

/// Per-epoch sample order.
struct Order {
    indices: Vec<usize>,
    rng: Option<StdRng>,
}

impl Order {
    fn new(len: usize, shuffle: Shuffle) -> Self {
        let rng = match shuffle {
            Shuffle::None => None,
            Shuffle::Random => Some(StdRng::from_entropy()),
            Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };
        Self {
            indices: (0..len).collect(),
            rng,
        }
    }

    fn next_epoch(&mut self) -> &[usize] {
        if let Some(rng) = &mut self.rng {
            self.indices.shuffle(rng);
        }
        &self.indices
    }
}

/// Running loss within one epoch, reported every `interval` samples.
struct EpochLoss {
    len: usize,
    interval: usize,
    seen: usize,
    total: f32,
    window: f32,
    window_len: usize,
}

impl EpochLoss {
    fn new(len: usize, interval: usize) -> Self {
        Self {
            len,
            interval,
            seen: 0,
            total: 0.0,
            window: 0.0,
            window_len: 0,
        }
    }

    fn record<P: ProgressSink + ?Sized>(&mut self, loss: f32, samples: usize, progress: &P) {
        self.seen += samples;
        self.total += loss;
        self.window += loss;
        self.window_len += samples;
        if self.window_len >= self.interval {
            progress.report(
                self.seen as f32 / self.len as f32,
                self.window / self.window_len as f32,
            );
            self.window = 0.0;
            self.window_len = 0;
        }
    }

    fn mean(&self) -> f32 {
        self.total / self.len as f32
    }
}

fn thread_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::InvalidConfig(format!("failed to build thread pool: {e}")))
}

/// Accumulate `indices` into the network through one working set. Returns the summed loss.
fn accumulate_chunk(
    net: &Network,
    ws: &mut NetworkWorkingSet,
    data: &Dataset,
    indices: &[usize],
) -> Result<f32> {
    // Biases are fixed for the whole batch.
    ws.fetch_bias(net)?;
    let mut total = 0.0_f32;
    for &idx in indices {
        ws.push_input(data.input(idx))?;
        ws.push_target(data.target(idx))?;
        ws.forward(net)?;
        total += ws.loss();
        ws.backward(net)?;
        ws.feed_back(net)?;
    }
    Ok(total)
}

impl Network {
    /// Online training: every sample is followed by a weight update.
    ///
    /// Sets the network's learning rate to `cfg.learning_rate`.
    pub fn fit<P: ProgressSink + ?Sized>(
        &mut self,
        data: &Dataset,
        cfg: FitConfig,
        progress: &P,
    ) -> Result<FitReport> {
        cfg.validate()?;
        self.check_dataset(data)?;
        self.set_learning_rate(cfg.learning_rate)?;
        debug!(
            "fit: {} samples, {} epochs, lr {}",
            data.len(),
            cfg.epochs,
            cfg.learning_rate
        );

        let mut order = Order::new(data.len(), cfg.shuffle);
        let mut epochs = Vec::with_capacity(cfg.epochs);

        for epoch in 1..=cfg.epochs {
            let mut running = EpochLoss::new(data.len(), cfg.report_interval);
            for &idx in order.next_epoch() {
                self.push_input(data.input(idx))?;
                self.push_target(data.target(idx))?;
                self.forward();
                let loss = self.loss();
                self.backward();
                self.update_weights();
                running.record(loss, 1, progress);
            }
            epochs.push(self.finish_epoch(data, &cfg, epoch, running.mean(), progress)?);
        }

        Ok(fit_report(epochs))
    }

    /// Mini-batch training on a `rayon` pool of `cfg.threads` workers.
    ///
    /// Each batch is split into contiguous chunks, one per worker. Workers run forward,
    /// backward and feed back against `&self`; once all of them are done the batch is
    /// averaged and applied with a single update.
    pub fn fit_batched<P: ProgressSink + ?Sized>(
        &mut self,
        data: &Dataset,
        cfg: FitConfig,
        progress: &P,
    ) -> Result<FitReport> {
        cfg.validate()?;
        self.check_dataset(data)?;
        self.set_learning_rate(cfg.learning_rate)?;

        let pool = thread_pool(cfg.threads)?;
        let mut workers: Vec<NetworkWorkingSet> = (0..pool.current_num_threads())
            .map(|_| self.working_set())
            .collect();
        debug!(
            "fit_batched: {} samples, {} epochs, batch_size {}, {} workers, lr {}",
            data.len(),
            cfg.epochs,
            cfg.batch_size,
            workers.len(),
            cfg.learning_rate
        );
        debug!("{} batches per epoch", data.len().div_ceil(cfg.batch_size));

        self.clear_accumulators();
        let mut order = Order::new(data.len(), cfg.shuffle);
        let mut epochs = Vec::with_capacity(cfg.epochs);

        for epoch in 1..=cfg.epochs {
            let mut running = EpochLoss::new(data.len(), cfg.report_interval);
            for (b, batch) in order.next_epoch().chunks(cfg.batch_size).enumerate() {
                let chunk = batch.len().div_ceil(workers.len());
                let net: &Network = self;
                let losses = pool.install(|| {
                    workers
                        .par_iter_mut()
                        .zip(batch.par_chunks(chunk))
                        .map(|(ws, indices)| accumulate_chunk(net, ws, data, indices))
                        .collect::<Result<Vec<f32>>>()
                })?;
                let batch_loss: f32 = losses.iter().sum();

                self.compute_average(batch.len());
                self.update_weights();
                self.clear_accumulators();

                trace!(
                    "epoch {epoch} batch {b}: {} samples, loss {:.6}",
                    batch.len(),
                    batch_loss / batch.len() as f32
                );
                running.record(batch_loss, batch.len(), progress);
            }
            epochs.push(self.finish_epoch(data, &cfg, epoch, running.mean(), progress)?);
        }

        Ok(fit_report(epochs))
    }

    /// Mean per-sample loss over `data`, computed on `threads` workers (0 = default).
    ///
    /// Uses private working sets only; the network's own buffers are not touched.
    pub fn evaluate_loss(&self, data: &Dataset, threads: usize) -> Result<f32> {
        self.check_dataset(data)?;
        let pool = thread_pool(threads)?;

        let losses = pool.install(|| {
            (0..data.len())
                .into_par_iter()
                .map_init(
                    || self.working_set(),
                    |ws, idx| -> Result<f32> {
                        ws.push_input(data.input(idx))?;
                        ws.push_target(data.target(idx))?;
                        ws.forward(self)?;
                        Ok(ws.loss())
                    },
                )
                .collect::<Result<Vec<f32>>>()
        })?;

        Ok(losses.iter().sum::<f32>() / data.len() as f32)
    }

    /// Fraction of samples whose largest output sits at the same index as the largest
    /// target. Progress is reported after every sample with the running mean loss.
    pub fn accuracy<P: ProgressSink + ?Sized>(&self, data: &Dataset, progress: &P) -> Result<f32> {
        self.check_dataset(data)?;

        let mut ws = self.working_set();
        let mut correct = 0usize;
        let mut total_loss = 0.0_f32;
        for idx in 0..data.len() {
            let target = data.target(idx);
            ws.push_input(data.input(idx))?;
            ws.push_target(target)?;
            ws.forward(self)?;
            if crate::loss::argmax(ws.output()) == crate::loss::argmax(target) {
                correct += 1;
            }
            total_loss += ws.loss();
            let n = idx + 1;
            progress.report(n as f32 / data.len() as f32, total_loss / n as f32);
        }

        Ok(correct as f32 / data.len() as f32)
    }

    fn finish_epoch<P: ProgressSink + ?Sized>(
        &self,
        data: &Dataset,
        cfg: &FitConfig,
        epoch: usize,
        train_loss: f32,
        progress: &P,
    ) -> Result<EpochReport> {
        let loss = self.evaluate_loss(data, cfg.threads)?;
        progress.report(1.0, loss);
        info!(
            "epoch {epoch}/{}: train_loss={train_loss:.6} loss={loss:.6}",
            cfg.epochs
        );
        Ok(EpochReport {
            epoch,
            train_loss,
            loss,
        })
    }

    fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if data.input_dim() != self.input_count() {
            return Err(Error::InvalidData(format!(
                "dataset input_dim {} does not match network input_count {}",
                data.input_dim(),
                self.input_count()
            )));
        }
        if data.target_dim() != self.output_count() {
            return Err(Error::InvalidData(format!(
                "dataset target_dim {} does not match network output_count {}",
                data.target_dim(),
                self.output_count()
            )));
        }
        Ok(())
    }
}

fn fit_report(epochs: Vec<EpochReport>) -> FitReport {
    let final_loss = epochs.last().map_or(f32::NAN, |e| e.loss);
    FitReport { epochs, final_loss }
}
