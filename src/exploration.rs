use rand::{seq::SliceRandom, Rng};
use strum::{IntoEnumIterator, VariantArray};

use crate::env::{Action, NUM_ACTIONS};

/// Pick a uniformly random action among those accepted by `is_valid`
///
/// This has the same distribution as drawing actions until a valid one comes up,
/// but returns `None` instead of spinning forever when no action is valid.
pub fn random_valid<R>(rng: &mut R, is_valid: impl Fn(Action) -> bool) -> Option<Action>
where
    R: Rng + ?Sized,
{
    let valid = Action::VARIANTS
        .iter()
        .copied()
        .filter(|&a| is_valid(a))
        .collect::<Vec<_>>();

    valid.choose(rng).copied()
}

/// Replace `default` with any valid action that scores strictly higher
///
/// Actions are scanned in index order against the current best. Ties keep the
/// earlier choice, and an invalid action is skipped without blocking later ones.
pub fn greedy_override(
    scores: &[f64; NUM_ACTIONS],
    default: Action,
    is_valid: impl Fn(Action) -> bool,
) -> Action {
    Action::iter().fold(default, |best, action| {
        if scores[action.index()] > scores[best.index()] && is_valid(action) {
            action
        } else {
            best
        }
    })
}

/// Index of the highest score, keeping the first on ties
pub fn argmax(scores: &[f64; NUM_ACTIONS]) -> Action {
    greedy_override(scores, Action::Up, |_| true)
}
