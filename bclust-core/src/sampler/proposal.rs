//! Relabelling proposals.
//!
//! A move picks two distinct labels x and y, takes one variable bearing x
//! and gives it label y. Moves between two singleton clusters are redrawn.
//!
//! With y drawn from the labels in use, y has at least two bearers after
//! the move; with a single cluster left, x has at least two bearers. The
//! redraw branch therefore never fires on a valid partition, `attempts` is
//! always 1 and the attempt ceiling is a guard only.

use rand::Rng;

use crate::error::{ClusterError, Result};
use crate::partition::Partition;

/// A candidate move and the assignment it would produce.
#[derive(Debug, Clone)]
pub struct Proposal {
    /// Label the moved variable leaves.
    pub from_label: usize,
    /// Label the moved variable joins.
    pub to_label: usize,
    /// Variable being relabelled.
    pub var: usize,
    /// Copy of the current assignment with `var` relabelled.
    pub proposed: Partition,
    /// Draws needed to find a non-trivial move (>= 1).
    pub attempts: usize,
}

/// True when `x` is a singleton before the move and `y` a singleton after it.
pub fn is_trivial_move(current: &Partition, proposed: &Partition, x: usize, y: usize) -> bool {
    current.count(x) == 1 && proposed.count(y) == 1
}

/// Draw an ordered pair of distinct labels.
///
/// Both come from the labels in use. When only one label is in use the
/// target is drawn from the unused label values instead.
fn draw_label_pair<R: Rng>(current: &Partition, rng: &mut R) -> Result<(usize, usize)> {
    let labels = current.distinct_labels();
    match labels.len() {
        0 => Err(ClusterError::Config(
            "cannot propose a move on an empty partition".into(),
        )),
        1 => {
            let unused = current.unused_labels();
            if unused.is_empty() {
                return Err(ClusterError::Config(
                    "cannot propose a move with a single variable".into(),
                ));
            }
            Ok((labels[0], unused[rng.gen_range(0..unused.len())]))
        }
        n => {
            let i = rng.gen_range(0..n);
            let mut j = rng.gen_range(0..n - 1);
            if j >= i {
                j += 1;
            }
            Ok((labels[i], labels[j]))
        }
    }
}

/// Draw a non-trivial relabelling move from `current`.
pub fn propose<R: Rng>(
    current: &Partition,
    rng: &mut R,
    max_attempts: usize,
) -> Result<Proposal> {
    for attempt in 1..=max_attempts {
        let (x, y) = draw_label_pair(current, rng)?;

        let bearers = current.members(x);
        let var = if bearers.len() > 1 {
            bearers[rng.gen_range(0..bearers.len())]
        } else {
            bearers[0]
        };

        let proposed = current.with_label(var, y);
        if !is_trivial_move(current, &proposed, x, y) {
            return Ok(Proposal {
                from_label: x,
                to_label: y,
                var,
                proposed,
                attempts: attempt,
            });
        }
    }
    Err(ClusterError::ProposalExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_trivial_move_detection() {
        // Singleton 0 moving to an unused label: nothing about the grouping changes.
        let current = Partition::from_labels(vec![0, 1, 1]).unwrap();
        let proposed = current.with_label(0, 2);
        assert!(is_trivial_move(&current, &proposed, 0, 2));

        // Singleton 0 merging into cluster 1.
        let proposed = current.with_label(0, 1);
        assert!(!is_trivial_move(&current, &proposed, 0, 1));

        // Splitting a member out of cluster 1 into an unused label.
        let proposed = current.with_label(2, 2);
        assert!(!is_trivial_move(&current, &proposed, 1, 2));
    }

    #[test]
    fn test_proposal_moves_one_bearer_of_x_to_y() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let current = Partition::from_labels(vec![0, 0, 2, 3, 3]).unwrap();
        for _ in 0..200 {
            let p = propose(&current, &mut rng, 100).unwrap();
            assert_ne!(p.from_label, p.to_label);
            assert_eq!(current.label(p.var), p.from_label);
            assert_eq!(p.proposed.label(p.var), p.to_label);
            assert!(current.count(p.to_label) > 0);
            let changed = current
                .labels()
                .iter()
                .zip(p.proposed.labels())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(changed, 1);
            assert!(!is_trivial_move(&current, &p.proposed, p.from_label, p.to_label));
        }
    }

    #[test]
    fn test_proposal_is_deterministic_under_seed() {
        let current = Partition::identity(6);
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..50 {
            let pa = propose(&current, &mut a, 100).unwrap();
            let pb = propose(&current, &mut b, 100).unwrap();
            assert_eq!(pa.proposed, pb.proposed);
        }
    }

    #[test]
    fn test_single_cluster_splits_into_unused_label() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let current = Partition::from_labels(vec![1, 1, 1, 1]).unwrap();
        let p = propose(&current, &mut rng, 10).unwrap();
        assert_eq!(p.from_label, 1);
        assert_ne!(p.to_label, 1);
        assert_eq!(p.proposed.count(p.to_label), 1);
        assert_eq!(p.proposed.count(1), 3);
    }

    #[test]
    fn test_single_variable_cannot_move() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let current = Partition::identity(1);
        assert!(matches!(
            propose(&current, &mut rng, 10),
            Err(ClusterError::Config(_))
        ));
    }

    #[test]
    fn test_zero_attempt_budget_is_exhausted() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let current = Partition::identity(4);
        assert_eq!(
            propose(&current, &mut rng, 0).unwrap_err(),
            ClusterError::ProposalExhausted { attempts: 0 }
        );
    }

    #[test]
    fn test_first_draw_is_always_non_trivial() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for labels in [vec![0, 1, 2, 3], vec![0, 0, 2, 3, 3], vec![2, 2, 2]] {
            let current = Partition::from_labels(labels).unwrap();
            for _ in 0..100 {
                assert_eq!(propose(&current, &mut rng, 1).unwrap().attempts, 1);
            }
        }
    }
}
