//! Splitting a round's inputs into merge jobs
//!
//! Every job gets its own output path inside the round's scratch directory.
//! Names combine a per-reducer counter, which alone guarantees uniqueness,
//! with a short random suffix that keeps concurrent runs sharing a
//! directory from ever racing on the same file name.

use rand::distr::Alphanumeric;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Length of the random part of an intermediate file name
pub const SUFFIX_LEN: usize = 6;

/// One merge-tool invocation: merge `input_paths` into `output_path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkJob {
    pub output_path: PathBuf,
    /// 1-based position of the first input within the round
    pub start_index: usize,
    /// 1-based position of the last input within the round
    pub end_index: usize,
    pub total_in_round: usize,
    pub input_paths: Vec<PathBuf>,
}

impl ChunkJob {
    pub fn len(&self) -> usize {
        self.input_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_paths.is_empty()
    }
}

/// Draw a random alphanumeric suffix of [`SUFFIX_LEN`] characters
pub fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// Build the output path for the `counter`-th job of a reducer.
///
/// Result has the form `<round_dir>/input_<counter>_<suffix>.<extension>`.
pub fn chunk_output_path<R: Rng>(
    round_dir: &Path,
    counter: u64,
    extension: &str,
    rng: &mut R,
) -> PathBuf {
    round_dir.join(format!(
        "input_{}_{}.{}",
        counter,
        random_suffix(rng),
        extension
    ))
}

/// Number of rounds needed to reduce `inputs` files to one with `batch_size`
///
/// This is `ceil(log_batch_size(inputs))`, with a single input still taking
/// one round when it goes through the reducer.
pub fn rounds_needed(inputs: usize, batch_size: usize) -> usize {
    if inputs == 0 || batch_size <= 1 {
        return 0;
    }
    let mut remaining = inputs;
    let mut rounds = 0;
    loop {
        remaining = remaining.div_ceil(batch_size);
        rounds += 1;
        if remaining <= 1 {
            return rounds;
        }
    }
}

/// Assigns inputs to jobs and names their outputs
pub struct Partitioner<R> {
    batch_size: usize,
    extension: String,
    counter: u64,
    rng: R,
}

impl<R: Rng> Partitioner<R> {
    /// `batch_size` must already be validated to be greater than one
    pub fn new(batch_size: usize, extension: impl Into<String>, rng: R) -> Self {
        debug_assert!(batch_size > 1, "batch size must exceed one");
        Self {
            batch_size,
            extension: extension.into(),
            counter: 0,
            rng,
        }
    }

    /// Number of output paths handed out so far
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Allocate the next unique output path inside `round_dir`
    pub fn next_output_path(&mut self, round_dir: &Path) -> PathBuf {
        let path = chunk_output_path(round_dir, self.counter, &self.extension, &mut self.rng);
        self.counter += 1;
        path
    }

    /// Split `inputs` into `ceil(N / batch_size)` jobs, in order.
    ///
    /// A set no larger than the batch size still yields exactly one job.
    pub fn partition(&mut self, round_dir: &Path, inputs: &[PathBuf]) -> Vec<ChunkJob> {
        let total = inputs.len();
        inputs
            .chunks(self.batch_size)
            .enumerate()
            .map(|(i, chunk)| {
                let start_index = i * self.batch_size + 1;
                ChunkJob {
                    output_path: self.next_output_path(round_dir),
                    start_index,
                    end_index: start_index + chunk.len() - 1,
                    total_in_round: total,
                    input_paths: chunk.to_vec(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("f{}.root", i))).collect()
    }

    fn partitioner(batch_size: usize) -> Partitioner<StdRng> {
        Partitioner::new(batch_size, "root", StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_output_path_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let path = chunk_output_path(Path::new("/scratch/0_abc"), 12, "dat", &mut rng);

        assert_eq!(path.parent(), Some(Path::new("/scratch/0_abc")));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("input_12_"));
        assert!(name.ends_with(".dat"));
        let suffix = &name["input_12_".len()..name.len() - ".dat".len()];
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_naming_is_deterministic_for_a_seed() {
        let dir = Path::new("/scratch");
        let a = chunk_output_path(dir, 0, "root", &mut StdRng::seed_from_u64(3));
        let b = chunk_output_path(dir, 0, "root", &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_partition_three_inputs_batch_two() {
        let mut p = partitioner(2);
        let jobs = p.partition(Path::new("/scratch/0"), &paths(3));

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].input_paths, paths(3)[..2].to_vec());
        assert_eq!((jobs[0].start_index, jobs[0].end_index), (1, 2));
        assert_eq!(jobs[1].input_paths, paths(3)[2..].to_vec());
        assert_eq!((jobs[1].start_index, jobs[1].end_index), (3, 3));
        assert!(jobs.iter().all(|j| j.total_in_round == 3));
    }

    #[test]
    fn test_small_set_yields_one_job() {
        let mut p = partitioner(20);
        let jobs = p.partition(Path::new("/scratch/0"), &paths(5));
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].len(), 5);
        assert_eq!((jobs[0].start_index, jobs[0].end_index), (1, 5));
    }

    #[test]
    fn test_counter_spans_rounds() {
        let mut p = partitioner(2);
        let first = p.partition(Path::new("/scratch/0"), &paths(4));
        let second = p.partition(Path::new("/scratch/1"), &paths(2));

        assert_eq!(p.counter(), 3);
        let names: Vec<_> = first
            .iter()
            .chain(second.iter())
            .map(|j| j.output_path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names[0].starts_with("input_0_"));
        assert!(names[1].starts_with("input_1_"));
        assert!(names[2].starts_with("input_2_"));
    }

    #[test]
    fn test_ten_thousand_names_are_distinct() {
        let mut p = Partitioner::new(2, "root", StdRng::from_os_rng());
        let dir = Path::new("/scratch/0");
        let names: HashSet<PathBuf> = (0..10_000).map(|_| p.next_output_path(dir)).collect();
        assert_eq!(names.len(), 10_000);
    }

    #[test]
    fn test_rounds_needed() {
        assert_eq!(rounds_needed(0, 2), 0);
        assert_eq!(rounds_needed(1, 2), 1);
        assert_eq!(rounds_needed(2, 2), 1);
        assert_eq!(rounds_needed(3, 2), 2);
        assert_eq!(rounds_needed(20, 20), 1);
        assert_eq!(rounds_needed(21, 20), 2);
        assert_eq!(rounds_needed(400, 20), 2);
        assert_eq!(rounds_needed(401, 20), 3);
        assert_eq!(rounds_needed(10, 1), 0);
    }

    proptest! {
        #[test]
        fn prop_partition_covers_inputs_exactly_once(
            n in 1usize..500usize,
            batch_size in 2usize..50usize,
        ) {
            let inputs = paths(n);
            let mut p = partitioner(batch_size);
            let jobs = p.partition(Path::new("/scratch/0"), &inputs);

            prop_assert_eq!(jobs.len(), n.div_ceil(batch_size));
            prop_assert!(jobs.iter().all(|j| !j.is_empty() && j.len() <= batch_size));

            let flattened: Vec<PathBuf> = jobs.iter().flat_map(|j| j.input_paths.clone()).collect();
            prop_assert_eq!(flattened, inputs);

            let outputs: HashSet<&PathBuf> = jobs.iter().map(|j| &j.output_path).collect();
            prop_assert_eq!(outputs.len(), jobs.len());
        }

        #[test]
        fn prop_rounds_bounded_by_log(
            n in 2usize..100_000usize,
            batch_size in 2usize..64usize,
        ) {
            let rounds = rounds_needed(n, batch_size);
            prop_assert!(rounds >= 1);
            // batch_size^rounds must cover n, and one fewer round must not
            prop_assert!((batch_size as u128).pow(rounds as u32) >= n as u128);
            prop_assert!((batch_size as u128).pow(rounds as u32 - 1) < n as u128);
        }
    }
}
