//! Independent, reproducible random number streams.
//!
//! Every random concern of the model (app ownership, infection seeding, contact selection,
//! transmission, infection duration) draws from its own generator, keyed by an `RngId` type
//! declared with `define_rng!`. Each generator is seeded from the context's base seed plus a
//! hash of the `RngId` name, so adding draws to one concern never shifts the draws of another,
//! and two contexts with the same base seed produce the same streams.
mod context_ext;

use std::any::{Any, TypeId};
use std::cell::RefCell;

pub use context_ext::ContextRandomExt;

use crate::rand::SeedableRng;
use crate::{define_data_plugin, HashMap};

pub trait RngId: Copy + Clone {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}

// This is a wrapper that allows for future support for different types of
// random number generators (anything that implements SeedableRng is valid).
struct RngHolder {
    rng: Box<dyn Any>,
}

struct RngData {
    base_seed: u64,
    rng_holders: RefCell<HashMap<TypeId, RngHolder>>,
}

// Registers a data container which stores:
// * base_seed: A base seed for all rngs
// * rng_holders: A map of rngs, keyed by their RngId. Note that this is
//   stored in a RefCell to allow for mutable borrow without requiring a
//   mutable borrow of the Context itself.
define_data_plugin!(
    RngPlugin,
    RngData,
    RngData {
        base_seed: 0,
        rng_holders: RefCell::new(HashMap::default()),
    }
);

/// Declares a zero-sized `RngId` key. The generator behind it is a `SmallRng` created lazily on
/// first use, so declaring a stream that a run never samples costs nothing.
#[macro_export]
macro_rules! define_rng {
    ($random_id:ident) => {
        #[derive(Copy, Clone)]
        struct $random_id;

        impl $crate::random::RngId for $random_id {
            type RngType = $crate::rand::rngs::SmallRng;

            fn get_name() -> &'static str {
                stringify!($random_id)
            }
        }

        // Two streams with the same name would share a seed; make that a link error.
        $crate::paste::paste! {
            #[doc(hidden)]
            #[no_mangle]
            #[allow(non_upper_case_globals)]
            pub static [<rng_name_duplication_guard_ $random_id>]: () = ();
        }
    };
}
pub use define_rng;
