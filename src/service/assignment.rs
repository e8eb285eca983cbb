//! Globally optimal claim/finding assignment
//!
//! Solves the rectangular maximum-weight bipartite assignment over the
//! full score matrix instead of greedy per-claim matching: greedy order
//! depends on input order and can strand a finding that was second-best
//! for two claims. The optimal assignment admits no improving swap, which
//! keeps scoring reproducible across re-runs with shuffled inputs.

/// One proposed claim/finding pair, by matrix index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignedPair {
    pub claim_idx: usize,
    pub finding_idx: usize,
    pub score: f64,
}

/// Solve the assignment problem over `matrix[claim][finding]`, then drop
/// pairs below `min_score_floor`; their claim and finding each revert to
/// unmatched. Callers pass rows/columns pre-sorted by record id so that
/// tie cases resolve deterministically (lowest claim id, then lowest
/// finding id).
pub fn solve(matrix: &[Vec<f64>], min_score_floor: f64) -> Vec<AssignedPair> {
    let claims = matrix.len();
    let findings = matrix.first().map(|row| row.len()).unwrap_or(0);
    if claims == 0 || findings == 0 {
        return Vec::new();
    }

    // The Hungarian kernel wants rows <= columns; transpose if needed.
    let transposed = claims > findings;
    let assignment = if transposed {
        let flipped: Vec<Vec<f64>> = (0..findings)
            .map(|j| (0..claims).map(|i| matrix[i][j]).collect())
            .collect();
        hungarian_max(&flipped)
    } else {
        hungarian_max(matrix)
    };

    let mut pairs: Vec<AssignedPair> = assignment
        .into_iter()
        .enumerate()
        .map(|(row, col)| {
            let (claim_idx, finding_idx) = if transposed { (col, row) } else { (row, col) };
            AssignedPair {
                claim_idx,
                finding_idx,
                score: matrix[claim_idx][finding_idx],
            }
        })
        .filter(|pair| pair.score >= min_score_floor)
        .collect();

    pairs.sort_by_key(|p| (p.claim_idx, p.finding_idx));
    pairs
}

/// Maximum-weight full assignment of every row to a distinct column,
/// rows <= columns. Classic Hungarian algorithm in the potentials
/// formulation, run on negated weights; O(rows^2 * cols).
fn hungarian_max(matrix: &[Vec<f64>]) -> Vec<usize> {
    let n = matrix.len();
    let m = matrix[0].len();
    debug_assert!(n <= m);

    // 1-based potentials over rows (u) and columns (v); p[j] is the row
    // currently matched to column j (0 = unmatched).
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        // Grow an alternating tree from row i until a free column is found
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                // Negated weight turns maximization into minimization
                let cur = -matrix[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Unwind the augmenting path
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut result = vec![0usize; n];
    for j in 1..=m {
        if p[j] > 0 {
            result[p[j] - 1] = j - 1;
        }
    }
    result
}
