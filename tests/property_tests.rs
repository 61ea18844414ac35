use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use wavix::bitvec::BitVector;
use wavix::{RankOp, WaveletMatrix};

fn naive_rank(vals: &[u64], pos: usize, val: u64) -> usize {
    vals[..pos].iter().filter(|&&x| x == val).count()
}

fn ordered(len: usize, a: usize, b: usize) -> (usize, usize) {
    let lo = a % (len + 1);
    let hi = b % (len + 1);
    (lo.min(hi), lo.max(hi))
}

fn prefix_matches(x: u64, v: u64, ignore_bits: usize, width: usize) -> bool {
    if ignore_bits >= width {
        true
    } else {
        x >> ignore_bits == v >> ignore_bits
    }
}

proptest! {
    #[test]
    fn bitvector_matches_naive(
        bits in prop::collection::vec(any::<bool>(), 1..600),
    ) {
        let bv = BitVector::from_bits(bits.iter().copied());
        prop_assert_eq!(bv.len(), bits.len());

        let total: usize = bits.iter().filter(|&&b| b).count();
        prop_assert_eq!(bv.ones(), total);
        prop_assert_eq!(bv.zeros(), bits.len() - total);

        let mut rank = 0;
        for (i, &b) in bits.iter().enumerate() {
            if i % 7 == 0 {
                prop_assert_eq!(bv.rank1(i), rank);
                prop_assert_eq!(bv.rank0(i), i - rank);
            }
            prop_assert_eq!(bv.get(i), b);
            if b {
                rank += 1;
            }
        }
        prop_assert_eq!(bv.rank1(bits.len()), total);

        let mut k1 = 0;
        let mut k0 = 0;
        for (i, &b) in bits.iter().enumerate() {
            if b {
                prop_assert_eq!(bv.select1(k1), Some(i));
                k1 += 1;
            } else {
                prop_assert_eq!(bv.select0(k0), Some(i));
                k0 += 1;
            }
        }
        prop_assert_eq!(bv.select1(k1), None);
        prop_assert_eq!(bv.select0(k0), None);
    }
}

proptest! {
    #[test]
    fn access_rank_select_consistency(
        vals in prop::collection::vec(0..50u64, 1..150),
    ) {
        let wm: WaveletMatrix = vals.iter().copied().collect();
        prop_assert_eq!(wm.len(), vals.len());
        prop_assert_eq!(wm.dim(), vals.iter().max().unwrap() + 1);

        for (pos, &val) in vals.iter().enumerate() {
            prop_assert_eq!(wm.access(pos), Some(val));
            let k = naive_rank(&vals, pos, val);
            prop_assert_eq!(wm.access_and_rank(pos), Some((val, k)));
            prop_assert_eq!(wm.select(k, val), Some(pos));
        }
        prop_assert_eq!(wm.access(vals.len()), None);

        let collected: Vec<u64> = wm.iter().collect();
        prop_assert_eq!(collected, vals.clone());

        // Exhausted selects report not-found.
        for &val in vals.iter().take(5) {
            let total = naive_rank(&vals, vals.len(), val);
            prop_assert_eq!(wm.select(total, val), None);
        }
    }

    #[test]
    fn rank_modes_partition_every_prefix(
        vals in prop::collection::vec(any::<u64>(), 1..40),
    ) {
        let wm: WaveletMatrix = vals.iter().copied().collect();
        let mut probes: Vec<u64> = vals.iter().take(6).copied().collect();
        probes.extend(vals.iter().take(5).map(|v| v.saturating_add(1)));
        probes.push(0);
        for pos in (0..=vals.len()).step_by(3) {
            for &val in &probes {
                let eq = wm.rank(pos, val);
                let lt = wm.rank_less_than(pos, val);
                let gt = wm.rank_more_than(pos, val);
                prop_assert_eq!(eq, naive_rank(&vals, pos, val));
                prop_assert_eq!(lt, vals[..pos].iter().filter(|&&x| x < val).count());
                prop_assert_eq!(gt, vals[..pos].iter().filter(|&&x| x > val).count());
                prop_assert_eq!(eq + lt + gt, pos);
            }
        }
    }

    #[test]
    fn ranged_ops_match_oracle(
        vals in prop::collection::vec(0..40u64, 1..120),
        a in any::<usize>(),
        b in any::<usize>(),
        v1 in 0..45u64,
        v2 in 0..45u64,
    ) {
        let wm: WaveletMatrix = vals.iter().copied().collect();
        let (lo, hi) = ordered(vals.len(), a, b);
        let window = &vals[lo..hi];

        for &val in &[v1, v2] {
            prop_assert_eq!(
                wm.ranged_rank_op(lo..hi, val, RankOp::Equal),
                window.iter().filter(|&&x| x == val).count()
            );
            prop_assert_eq!(
                wm.ranged_rank_op(lo..hi, val, RankOp::LessThan),
                window.iter().filter(|&&x| x < val).count()
            );
            prop_assert_eq!(
                wm.ranged_rank_op(lo..hi, val, RankOp::MoreThan),
                window.iter().filter(|&&x| x > val).count()
            );
        }

        let (vlo, vhi) = (v1.min(v2), v1.max(v2));
        prop_assert_eq!(
            wm.ranged_rank_range(lo..hi, vlo..vhi),
            window.iter().filter(|&&x| vlo <= x && x < vhi).count()
        );
    }

    #[test]
    fn quantile_matches_sorted_window(
        vals in prop::collection::vec(0..64u64, 1..120),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let wm: WaveletMatrix = vals.iter().copied().collect();
        let (lo, hi) = ordered(vals.len(), a, b);
        let mut window = vals[lo..hi].to_vec();
        window.sort_unstable();
        for (k, &v) in window.iter().enumerate() {
            prop_assert_eq!(wm.quantile(lo..hi, k), Some(v));
        }
        prop_assert_eq!(wm.quantile(lo..hi, window.len()), None);
    }

    #[test]
    fn intersect_matches_set_count_oracle(
        vals in prop::collection::vec(0..24u64, 1..80),
        seeds in prop::collection::vec((any::<usize>(), any::<usize>()), 0..5),
        k in 0..5usize,
    ) {
        let wm: WaveletMatrix = vals.iter().copied().collect();
        let ranges: Vec<std::ops::Range<usize>> = seeds
            .iter()
            .map(|&(a, b)| {
                let (lo, hi) = ordered(vals.len(), a, b);
                lo..hi
            })
            .collect();

        let mut counts: HashMap<u64, usize> = HashMap::new();
        for r in &ranges {
            let distinct: HashSet<u64> = vals[r.clone()].iter().copied().collect();
            for v in distinct {
                *counts.entry(v).or_insert(0) += 1;
            }
        }
        let mut expected: Vec<u64> = counts
            .into_iter()
            .filter(|&(_, c)| c >= k.max(1))
            .map(|(v, _)| v)
            .collect();
        expected.sort_unstable();

        prop_assert_eq!(wm.intersect(&ranges, k), expected);
    }

    #[test]
    fn low_bit_prefix_forms_match_mask_oracle(
        vals in prop::collection::vec(0..32u64, 1..100),
        a in any::<usize>(),
        b in any::<usize>(),
        v in 0..40u64,
        ignore_bits in 0..8usize,
    ) {
        let wm: WaveletMatrix = vals.iter().copied().collect();
        let (lo, hi) = ordered(vals.len(), a, b);
        let width = wm.width();

        let matches: Vec<usize> = (lo..hi)
            .filter(|&i| prefix_matches(vals[i], v, ignore_bits, width))
            .collect();

        prop_assert_eq!(
            wm.ranged_rank_ignore_lsbs(lo..hi, v, ignore_bits),
            matches.len()
        );
        for k in 0..=matches.len() {
            prop_assert_eq!(
                wm.ranged_select_ignore_lsbs(lo..hi, k, v, ignore_bits),
                matches.get(k).copied(),
                "k={} v={} ignore_bits={}", k, v, ignore_bits
            );
        }
    }

    #[test]
    fn plain_select_agrees_with_truncated_select(
        vals in prop::collection::vec(0..32u64, 1..100),
        v in 0..40u64,
        k in 0..100usize,
    ) {
        let wm: WaveletMatrix = vals.iter().copied().collect();
        prop_assert_eq!(
            wm.select(k, v),
            wm.ranged_select_ignore_lsbs(0..wm.len(), k, v, 0)
        );
    }

    #[test]
    fn codec_roundtrip_preserves_queries(
        vals in prop::collection::vec(0..100u64, 0..120),
    ) {
        let wm: WaveletMatrix = vals.iter().copied().collect();
        let bytes = wm.to_bytes().unwrap();
        let other = WaveletMatrix::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&other, &wm);
        for pos in 0..vals.len() {
            prop_assert_eq!(other.access(pos), wm.access(pos));
        }
        prop_assert_eq!(other.to_bytes().unwrap(), bytes);
    }
}
