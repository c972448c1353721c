//! Cross-scale arbitration between corners found on different pyramid levels.

use kiddo::{KdTree, SquaredEuclidean};
use log::trace;
use xcorners_core::XCorner;

use crate::params::PyramidParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Merge per-level detections (already in base-image coordinates) and return
/// the surviving corners, finest level first.
///
/// Every live corner of level `l` is compared against the strongest of its
/// neighbours on each coarser level `u`. Intensities are discounted by
/// `1 + level` so that, all else equal, the finer detection wins. Matched
/// coarse corners are marked dead either way.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(levels, params), fields(num_levels = levels.len()))
)]
pub(crate) fn consolidate_levels(levels: &mut [Vec<XCorner>], params: &PyramidParams) -> Vec<XCorner> {
    let n = levels.len();
    let adopt_r2 = params.adopt_radius() * params.adopt_radius();

    for l in 0..n {
        for u in (l + 1)..n {
            let (fine, coarse) = levels.split_at_mut(u);
            let fine = &mut fine[l];
            let coarse = &mut coarse[0];
            if fine.is_empty() || coarse.is_empty() {
                continue;
            }

            let coords = coarse
                .iter()
                .map(|c| [c.position.x, c.position.y])
                .collect::<Vec<_>>();
            let tree: KdTree<f32, 2> = (&coords).into();
            let radius = params.search_radius_at(u);

            for c0 in fine.iter_mut().filter(|c| c.first) {
                let query = [c0.position.x, c0.position.y];
                let results = tree.within::<SquaredEuclidean>(&query, radius * radius);

                let mut best: Option<usize> = None;
                for nn in results.iter().take(params.search_max_count) {
                    let idx = nn.item as usize;
                    if best.is_none_or(|b| coarse[idx].intensity > coarse[b].intensity) {
                        best = Some(idx);
                    }
                    coarse[idx].first = false;
                }
                let Some(best) = best else {
                    continue;
                };

                let candidate = &coarse[best];
                let mine = c0.intensity / (1.0 + c0.level_max as f32);
                let theirs = candidate.intensity / (1.0 + candidate.level1 as f32);
                if mine < theirs && c0.distance_sq(candidate) <= adopt_r2 {
                    trace!(
                        "level {l} corner at ({:.1}, {:.1}) adopts level {u}",
                        c0.position.x,
                        c0.position.y
                    );
                    c0.adopt(candidate);
                } else {
                    c0.level2 = candidate.level2;
                }
            }
        }
    }

    levels
        .iter()
        .flat_map(|lvl| lvl.iter().filter(|c| c.first).cloned())
        .collect()
}
