pub use rand_chacha::ChaCha8Rng as SeededRng;

pub fn new_rng(seed: u64) -> SeededRng {
    rand_seeder::Seeder::from(seed).make_rng()
}

/// Returns an independent stream under a shared root seed, so each consumer
/// (one per agent, say) stays reproducible without sharing a generator.
pub fn derive_rng(root_seed: u64, stream: u64) -> SeededRng {
    let mut rng = new_rng(root_seed);
    rng.set_stream(stream);
    rng
}
