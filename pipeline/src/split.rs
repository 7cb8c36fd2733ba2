use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `rows` indices with a seeded generator and holds out
/// `ceil(rows * test_fraction)` of them.
///
/// # Arguments
/// * `rows` - Amount of rows to partition.
/// * `test_fraction` - Share of held-out rows, expected in (0, 1).
/// * `seed` - Seed of the shuffle, the same seed always yields the same split.
pub fn train_test_split(rows: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_rows = ((rows as f64) * test_fraction).ceil() as usize;
    let train = indices.split_off(test_rows.min(rows));

    Split {
        train,
        test: indices,
    }
}
