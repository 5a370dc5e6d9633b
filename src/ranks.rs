// Rank ladder shown in the ranks modal. The server stays authoritative for the
// player's current rank; this table only previews the thresholds.

/// (display name, fraction of total attainable score)
pub const RANK_LADDER: &[(&str, f64)] = &[
    ("Egg", 0.00),
    ("Bit Useless, Eh", 0.03),
    ("Not Bad, Bro", 0.08),
    ("Sweet As", 0.15),
    ("On the Piss", 0.25),
    ("Full Noise", 0.40),
    ("Bloody Weapon", 0.60),
    ("Choice", 0.80),
    ("King", 1.00),
];

#[derive(Clone, Debug, PartialEq)]
pub struct RankRow {
    pub name: &'static str,
    pub fraction: f64,
    /// Minimum score needed to reach this rank.
    pub points: u32,
}

pub fn rank_rows(total_score: u32) -> Vec<RankRow> {
    RANK_LADDER
        .iter()
        .map(|&(name, fraction)| RankRow {
            name,
            fraction,
            // Epsilon keeps exact products like 0.08 * 50 from ceiling past 4.
            points: (fraction * total_score as f64 - 1e-9).ceil().max(0.0) as u32,
        })
        .collect()
}

/// Index of the highest rank reached by `score`, used to highlight the row.
pub fn reached_index(score: u32, total_score: u32) -> usize {
    if total_score == 0 {
        return 0;
    }
    rank_rows(total_score)
        .iter()
        .rposition(|r| score >= r.points)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_are_ceiled_and_monotonic() {
        let rows = rank_rows(50);
        assert_eq!(rows[0].points, 0);
        assert_eq!(rows[1].points, 2); // 1.5 -> 2
        assert_eq!(rows.last().unwrap().points, 50);
        assert!(rows.windows(2).all(|w| w[0].points <= w[1].points));
    }

    #[test]
    fn reached_index_tracks_score() {
        assert_eq!(reached_index(0, 50), 0);
        assert_eq!(reached_index(4, 50), 2);
        assert_eq!(reached_index(50, 50), RANK_LADDER.len() - 1);
        assert_eq!(reached_index(10, 0), 0);
    }
}
