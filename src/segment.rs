//! Segment classification: a fixed, ordered rule table over RFM scores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six behavioral segments, in rule-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "Potential Loyalists")]
    PotentialLoyalists,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Need Attention")]
    NeedAttention,
    Lost,
}

impl Segment {
    /// All segments, in rule-table order.
    pub const ALL: [Segment; 6] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::PotentialLoyalists,
        Segment::AtRisk,
        Segment::NeedAttention,
        Segment::Lost,
    ];

    /// Display label, as it appears in reports and chart legends.
    pub fn label(self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::PotentialLoyalists => "Potential Loyalists",
            Segment::AtRisk => "At Risk",
            Segment::NeedAttention => "Need Attention",
            Segment::Lost => "Lost",
        }
    }

    /// Fixed display color as an RGB triple. The exact values are part of
    /// the output contract.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Segment::Champions => (0x10, 0xb9, 0x81),
            Segment::LoyalCustomers => (0x3b, 0x82, 0xf6),
            Segment::PotentialLoyalists => (0x8b, 0x5c, 0xf6),
            Segment::AtRisk => (0xf5, 0x9e, 0x0b),
            Segment::NeedAttention => (0xef, 0x44, 0x44),
            Segment::Lost => (0x64, 0x74, 0x8b),
        }
    }

    /// Fixed display color as a `#rrggbb` string.
    pub fn color_hex(self) -> String {
        let (r, g, b) = self.color();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Parse a display label, case-insensitively. Returns `None` for anything
    /// that is not one of the six fixed labels.
    pub fn from_label(text: &str) -> Option<Segment> {
        let text = text.trim();
        Segment::ALL
            .into_iter()
            .find(|segment| segment.label().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classification rule: a predicate over (r, f, m) and the segment it assigns.
type SegmentRule = (fn(u8, u8, u8) -> bool, Segment);

/// Ordered classification rules. The ranges overlap (e.g. (3,3,3) satisfies
/// both the Loyal Customers and Potential Loyalists conditions), so evaluation
/// order is part of the contract: the first matching rule wins.
const SEGMENT_RULES: [SegmentRule; 5] = [
    (|r, f, m| r >= 4 && f >= 4 && m >= 4, Segment::Champions),
    (|r, f, m| r >= 3 && f >= 3 && m >= 3, Segment::LoyalCustomers),
    (|r, f, m| r >= 3 && f <= 3 && m >= 2, Segment::PotentialLoyalists),
    (|r, f, m| r <= 2 && f >= 3 && m >= 3, Segment::AtRisk),
    (|r, f, m| r <= 3 && f <= 2 && m <= 3, Segment::NeedAttention),
];

/// Assign a segment from the three quintile scores.
///
/// Total over all score triples: anything no rule matches falls through to
/// `Lost`, so every customer gets exactly one segment.
pub fn classify(r_score: u8, f_score: u8, m_score: u8) -> Segment {
    SEGMENT_RULES
        .iter()
        .find(|(applies, _)| applies(r_score, f_score, m_score))
        .map(|&(_, segment)| segment)
        .unwrap_or(Segment::Lost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_scores_are_champions() {
        assert_eq!(classify(5, 5, 5), Segment::Champions);
        assert_eq!(classify(4, 4, 4), Segment::Champions);
        assert_eq!(classify(4, 5, 4), Segment::Champions);
    }

    #[test]
    fn rule_order_resolves_overlaps() {
        // (3,3,3) satisfies both the Loyal Customers and Potential Loyalists
        // conditions; the earlier rule must win.
        assert_eq!(classify(3, 3, 3), Segment::LoyalCustomers);
        assert_eq!(classify(3, 3, 5), Segment::LoyalCustomers);
    }

    #[test]
    fn recent_low_frequency_buyers_are_potential_loyalists() {
        assert_eq!(classify(5, 1, 2), Segment::PotentialLoyalists);
        assert_eq!(classify(3, 2, 2), Segment::PotentialLoyalists);
        assert_eq!(classify(4, 3, 2), Segment::PotentialLoyalists);
    }

    #[test]
    fn lapsed_high_value_buyers_are_at_risk() {
        assert_eq!(classify(1, 5, 5), Segment::AtRisk);
        assert_eq!(classify(2, 3, 3), Segment::AtRisk);
    }

    #[test]
    fn low_scores_need_attention() {
        // (1,1,1) lands in the r<=3, f<=2, m<=3 rule, not in Lost.
        assert_eq!(classify(1, 1, 1), Segment::NeedAttention);
        assert_eq!(classify(3, 2, 3), Segment::NeedAttention);
        assert_eq!(classify(2, 1, 1), Segment::NeedAttention);
    }

    #[test]
    fn unmatched_triples_fall_through_to_lost() {
        assert_eq!(classify(1, 1, 5), Segment::Lost);
        assert_eq!(classify(2, 5, 2), Segment::Lost);
        assert_eq!(classify(1, 3, 2), Segment::Lost);
    }

    #[test]
    fn every_score_triple_classifies() {
        let mut lost = 0;
        for r in 1..=5u8 {
            for f in 1..=5u8 {
                for m in 1..=5u8 {
                    let segment = classify(r, f, m);
                    assert!(Segment::ALL.contains(&segment));
                    if segment == Segment::Lost {
                        lost += 1;
                    }
                }
            }
        }
        // The catch-all is reachable but not dominant.
        assert!(lost > 0);
        assert!(lost < 125);
    }

    #[test]
    fn labels_round_trip() {
        for segment in Segment::ALL {
            assert_eq!(Segment::from_label(segment.label()), Some(segment));
        }
        assert_eq!(Segment::from_label("loyal customers"), Some(Segment::LoyalCustomers));
        assert_eq!(Segment::from_label("  AT RISK "), Some(Segment::AtRisk));
        assert_eq!(Segment::from_label("Whales"), None);
    }

    #[test]
    fn colors_are_fixed_hex() {
        assert_eq!(Segment::Champions.color_hex(), "#10b981");
        assert_eq!(Segment::LoyalCustomers.color_hex(), "#3b82f6");
        assert_eq!(Segment::PotentialLoyalists.color_hex(), "#8b5cf6");
        assert_eq!(Segment::AtRisk.color_hex(), "#f59e0b");
        assert_eq!(Segment::NeedAttention.color_hex(), "#ef4444");
        assert_eq!(Segment::Lost.color_hex(), "#64748b");
    }

    #[test]
    fn serializes_as_display_label() {
        let json = serde_json::to_string(&Segment::LoyalCustomers).unwrap();
        assert_eq!(json, "\"Loyal Customers\"");
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Segment::LoyalCustomers);
    }
}
