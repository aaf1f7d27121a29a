use std::any::TypeId;
use std::cell::RefMut;

use log::trace;

use crate::context::Context;
use crate::hashing::hash_str;
use crate::rand::distr::uniform::{SampleRange, SampleUniform};
use crate::rand::{Rng, SeedableRng};
use crate::random::{RngHolder, RngId, RngPlugin};

/// Gets a mutable reference to the random number generator associated with the given
/// [`RngId`]. If the Rng has not been used before, one will be created with the base seed
/// you defined in `init_random`.
fn get_rng<R: RngId + 'static>(context: &Context) -> RefMut<R::RngType> {
    let data_container = context.get_data(RngPlugin);

    let rng_holders = data_container.rng_holders.try_borrow_mut().unwrap();
    RefMut::map(rng_holders, |holders| {
        holders
            .entry(TypeId::of::<R>())
            .or_insert_with(|| {
                trace!(
                    "creating new RNG (seed={}) for {}",
                    data_container.base_seed,
                    R::get_name()
                );
                let seed_offset = hash_str(R::get_name());
                RngHolder {
                    rng: Box::new(R::RngType::seed_from_u64(
                        data_container.base_seed.wrapping_add(seed_offset),
                    )),
                }
            })
            .rng
            .downcast_mut::<R::RngType>()
            .unwrap()
    })
}

// This is a trait extension on Context for
// random number generation functionality.
pub trait ContextRandomExt {
    /// Sets the base seed for every stream of this context. Streams are created lazily on
    /// first use, so calling this again re-seeds all of them.
    fn init_random(&mut self, base_seed: u64);

    /// Returns the base seed set by `init_random`.
    fn get_base_seed(&self) -> u64;

    /// Gets a random sample from the random number generator associated with the given
    /// [`RngId`] by applying the specified sampler function.
    /// Note that this will panic if `init_random` was not called yet.
    fn sample<R: RngId + 'static, T>(
        &self,
        rng_type: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T;

    /// Gets a random sample within the range provided by `range`
    /// using the generator associated with the given [`RngId`].
    fn sample_range<R: RngId + 'static, S, T>(&self, rng_id: R, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform;

    /// Gets a random boolean value which is true with probability `p`
    /// using the generator associated with the given [`RngId`].
    ///
    /// `p` must be in `[0, 1]`; parameters are validated before any sampling happens.
    fn sample_bool<R: RngId + 'static>(&self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng;
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        trace!("initializing random module with base seed {base_seed}");
        let data_container = self.get_data_mut(RngPlugin);
        data_container.base_seed = base_seed;

        // Clear any existing Rngs to ensure they get re-seeded when `get_rng` is called
        data_container.rng_holders.get_mut().clear();
    }

    fn get_base_seed(&self) -> u64 {
        self.get_data(RngPlugin).base_seed
    }

    fn sample<R: RngId + 'static, T>(
        &self,
        _rng_type: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        let mut rng = get_rng::<R>(self);
        sampler(&mut rng)
    }

    fn sample_range<R: RngId + 'static, S, T>(&self, rng_id: R, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    fn sample_bool<R: RngId + 'static>(&self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| rng.random_bool(p))
    }
}
