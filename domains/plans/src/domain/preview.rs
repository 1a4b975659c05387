//! Preview page selection

use rand::seq::SliceRandom;
use rand::Rng;

/// Number of pages sampled when the author did not choose any: half, rounded up
#[mutants::skip] // The fallback arm only sees negative counts, which never pass validation
pub fn sample_size(total_pages: i32) -> usize {
    usize::try_from(total_pages).map_or(0, |n| n.div_ceil(2))
}

/// Choose the pages exposed by a preview.
///
/// An author-curated list is returned unchanged. Otherwise `ceil(N / 2)`
/// distinct pages are drawn from `1..=N` with a partial Fisher-Yates shuffle
/// and returned in ascending order, so selection always finishes in `O(N)`.
pub fn select_pages<R>(total_pages: i32, explicit: &[i32], rng: &mut R) -> Vec<i32>
where
    R: Rng + ?Sized,
{
    if !explicit.is_empty() {
        return explicit.to_vec();
    }

    let mut pages: Vec<i32> = (1..=total_pages).collect();
    let (chosen, _) = pages.partial_shuffle(rng, sample_size(total_pages));
    let mut chosen = chosen.to_vec();
    chosen.sort_unstable();
    chosen
}
