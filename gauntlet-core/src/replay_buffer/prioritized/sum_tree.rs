//! Sum tree for prioritized sampling.
use rand::{rngs::StdRng, Rng};
use segment_tree::{ops::MaxIgnoreNaN, SegmentPoint};

/// Binary tree in a flat array whose leaves hold priorities and whose inner
/// nodes hold the sums of their children.
#[derive(Debug)]
pub struct SumTree {
    capacity: usize,
    n_samples: usize,
    tree: Vec<f32>,
    max_tree: SegmentPoint<f32, MaxIgnoreNaN>,
}

impl SumTree {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            n_samples: 0,
            tree: vec![0f32; 2 * capacity - 1],
            max_tree: SegmentPoint::build(vec![0f32; capacity], MaxIgnoreNaN),
        }
    }

    fn propagate(&mut self, mut ix: usize, change: f32) {
        while ix != 0 {
            ix = (ix - 1) / 2;
            self.tree[ix] += change;
        }
    }

    fn retrieve(&self, ix: usize, s: f32) -> usize {
        let left = 2 * ix + 1;
        let right = left + 1;

        if left >= self.tree.len() {
            return ix;
        }

        let go_left = self.tree[right] <= 0f32 || (self.tree[left] > 0f32 && s < self.tree[left]);
        if go_left {
            self.retrieve(left, s)
        } else {
            self.retrieve(right, s - self.tree[left])
        }
    }

    /// Number of leaves holding a priority.
    pub fn len(&self) -> usize {
        self.n_samples
    }

    /// Sum of all priorities.
    pub fn total(&self) -> f32 {
        self.tree[0]
    }

    /// Largest stored priority, 1 if the tree is empty.
    pub fn max(&self) -> f32 {
        if self.n_samples == 0 {
            1f32
        } else {
            self.max_tree.query(0, self.max_tree.len())
        }
    }

    /// Priority at `ix`-th leaf.
    pub fn priority(&self, ix: usize) -> f32 {
        self.tree[ix + self.capacity - 1]
    }

    /// Sets the priority of `ix`-th leaf, counting it as stored if new.
    pub fn add(&mut self, ix: usize, p: f32) {
        debug_assert!(ix <= self.n_samples);
        self.update(ix, p);
        if self.n_samples < self.capacity && ix == self.n_samples {
            self.n_samples += 1;
        }
    }

    /// Updates the priority of `ix`-th leaf.
    pub fn update(&mut self, ix: usize, p: f32) {
        debug_assert!(ix < self.capacity);
        debug_assert!(p.is_finite() && p > 0f32);

        self.max_tree.modify(ix, p);
        let ix = ix + self.capacity - 1;
        let change = p - self.tree[ix];
        self.tree[ix] = p;
        self.propagate(ix, change);
    }

    /// Index of the leaf at which the cumulative priority exceeds `s`.
    pub fn get(&self, s: f32) -> usize {
        let ix = self.retrieve(0, s);
        debug_assert!(ix >= (self.capacity - 1));
        ix + 1 - self.capacity
    }

    /// Samples indices with probability proportional to priority.
    ///
    /// Returns the indices with the weights $w_i=\left(N P(i)\right)^{-\beta}$
    /// normalized by their maximum within the batch.
    pub fn sample(&self, batch_size: usize, beta: f32, rng: &mut StdRng) -> (Vec<usize>, Vec<f32>) {
        let p_sum = self.total();
        let ixs = (0..batch_size)
            .map(|_| self.get(p_sum * rng.gen::<f32>()))
            .collect::<Vec<_>>();

        let n = self.n_samples as f32 / p_sum;
        let ws = ixs
            .iter()
            .map(|&ix| (n * self.priority(ix)).powf(-beta))
            .collect::<Vec<_>>();
        let w_max = ws.iter().fold(f32::MIN, |m, &w| m.max(w));
        let ws = ws.iter().map(|w| w / w_max).collect();

        (ixs, ws)
    }

    /// Removes all priorities.
    pub fn clear(&mut self) {
        self.tree.iter_mut().for_each(|p| *p = 0f32);
        self.max_tree = SegmentPoint::build(vec![0f32; self.capacity], MaxIgnoreNaN);
        self.n_samples = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::SumTree;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_sum_tree_odd_capacity() {
        let data = vec![0.5f32, 0.2, 0.8, 0.3, 1.1, 2.5, 3.9];
        let mut sum_tree = SumTree::new(7);
        for (ix, &p) in data.iter().enumerate() {
            sum_tree.add(ix, p);
        }
        assert_eq!(sum_tree.len(), 7);
        assert!((sum_tree.total() - data.iter().sum::<f32>()).abs() < 1e-5);
        assert_eq!(sum_tree.max(), 3.9);

        let mut rng = StdRng::seed_from_u64(42);
        let n_samples = 100000;
        let (ixs, ws) = sum_tree.sample(n_samples, 1.0, &mut rng);
        assert!(ixs.iter().all(|&ix| ix < data.len()));
        assert!(ws.iter().all(|&w| w > 0.0 && w <= 1.0));

        for (ix, &p) in data.iter().enumerate() {
            let expected = p / sum_tree.total();
            let freq = ixs.iter().filter(|&&e| e == ix).count() as f32 / n_samples as f32;
            assert!((freq - expected).abs() < 0.01, "ix={}: {} vs {}", ix, freq, expected);
        }
    }

    #[test]
    fn test_update_changes_total_and_max() {
        let mut sum_tree = SumTree::new(4);
        assert_eq!(sum_tree.max(), 1.0);
        sum_tree.add(0, 1.0);
        sum_tree.add(1, 2.0);
        sum_tree.update(1, 0.5);
        assert!((sum_tree.total() - 1.5).abs() < 1e-6);
        assert_eq!(sum_tree.max(), 1.0);
        sum_tree.clear();
        assert_eq!(sum_tree.len(), 0);
        assert_eq!(sum_tree.total(), 0.0);
    }
}
