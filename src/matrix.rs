use fixedbitset::FixedBitSet;

/// Rectangular Boolean matrix backed by one bitset per row.
///
/// All adjacency and reachability matrices in this crate are instances of
/// this type. Row-level bitset operations keep the fixed-point loops cheap
/// without a dedicated sparse-algebra dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    cols: usize,
    rows: Vec<FixedBitSet>,
}

impl BitMatrix {
    /// Creates an all-false matrix of the given shape.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            rows: vec![FixedBitSet::with_capacity(cols); rows],
        }
    }

    /// Creates the `n × n` identity matrix.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m.rows[i].insert(i);
        }
        m
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Sets entry `(i, j)` to true.
    pub fn set(&mut self, i: usize, j: usize) {
        self.rows[i].insert(j);
    }

    /// Returns entry `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.rows[i].contains(j)
    }

    /// Borrows row `i`.
    #[must_use]
    pub fn row(&self, i: usize) -> &FixedBitSet {
        &self.rows[i]
    }

    /// Total number of true entries.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones(..)).sum()
    }

    /// True when no entry is set.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(FixedBitSet::is_clear)
    }

    /// Iterates over the `(row, col)` coordinates of all true entries.
    pub fn ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.ones().map(move |j| (i, j)))
    }

    /// ORs `other` into `self` and reports whether any new entry appeared.
    pub fn union_with(&mut self, other: &BitMatrix) -> bool {
        debug_assert_eq!(self.rows.len(), other.rows.len());
        debug_assert_eq!(self.cols, other.cols);
        let mut changed = false;
        for (row, other_row) in self.rows.iter_mut().zip(&other.rows) {
            let before = row.count_ones(..);
            row.union_with(other_row);
            changed |= row.count_ones(..) != before;
        }
        changed
    }

    /// Clears every entry of `self` that is set in `other`.
    pub fn difference_with(&mut self, other: &BitMatrix) {
        debug_assert_eq!(self.rows.len(), other.rows.len());
        debug_assert_eq!(self.cols, other.cols);
        for (row, other_row) in self.rows.iter_mut().zip(&other.rows) {
            row.difference_with(other_row);
        }
    }

    /// Boolean matrix product `self · other`.
    #[must_use]
    pub fn mul(&self, other: &BitMatrix) -> BitMatrix {
        debug_assert_eq!(self.cols, other.rows.len());
        let mut product = BitMatrix::new(self.rows.len(), other.cols);
        for (row, out) in self.rows.iter().zip(product.rows.iter_mut()) {
            for k in row.ones() {
                out.union_with(&other.rows[k]);
            }
        }
        product
    }

    /// Kronecker product `self ⊗ other`.
    ///
    /// Entry `(i·R + k, j·C + l)` is true iff `self[i, j] && other[k, l]`,
    /// where `R × C` is the shape of `other`.
    #[must_use]
    pub fn kronecker(&self, other: &BitMatrix) -> BitMatrix {
        let mut product = BitMatrix::new(self.rows.len() * other.rows.len(), self.cols * other.cols);
        for (i, j) in self.ones() {
            for (k, l) in other.ones() {
                product.set(i * other.rows.len() + k, j * other.cols + l);
            }
        }
        product
    }

    /// Block-diagonal composition `diag(a, b)`.
    #[must_use]
    pub fn block_diag(a: &BitMatrix, b: &BitMatrix) -> BitMatrix {
        let mut m = BitMatrix::new(a.rows.len() + b.rows.len(), a.cols + b.cols);
        for (i, j) in a.ones() {
            m.set(i, j);
        }
        for (i, j) in b.ones() {
            m.set(a.rows.len() + i, a.cols + j);
        }
        m
    }

    /// Horizontal composition `[left | right]`. Both must share a row count.
    #[must_use]
    pub fn hstack(left: &BitMatrix, right: &BitMatrix) -> BitMatrix {
        debug_assert_eq!(left.rows.len(), right.rows.len());
        let mut m = BitMatrix::new(left.rows.len(), left.cols + right.cols);
        for (i, j) in left.ones() {
            m.set(i, j);
        }
        for (i, j) in right.ones() {
            m.set(i, left.cols + j);
        }
        m
    }

    /// Reflexive-transitive closure of a square matrix.
    ///
    /// Forces the diagonal, then runs Warshall's algorithm one bitset row at
    /// a time.
    #[must_use]
    pub fn transitive_closure(&self) -> BitMatrix {
        debug_assert_eq!(self.rows.len(), self.cols);
        let mut closure = self.clone();
        let n = closure.rows.len();
        for i in 0..n {
            closure.rows[i].insert(i);
        }
        for k in 0..n {
            let pivot = closure.rows[k].clone();
            for i in 0..n {
                if closure.rows[i].contains(k) {
                    closure.rows[i].union_with(&pivot);
                }
            }
        }
        closure
    }
}
