use serde::{Deserialize, Serialize};

use crate::metrics::Segment;

/// Order-count boundaries for customer segmentation.
///
/// These are business policy, not physics: the defaults match the
/// historical reporting behavior (New = 1 order, Repeat = 2–3,
/// Loyal = 4–9, VIP = 10+) but are injected so deployments can tune
/// them. A customer sitting exactly on a boundary lands in the higher
/// segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentThresholds {
    pub repeat_min: i64,
    pub loyal_min: i64,
    pub vip_min: i64,
}

impl Default for SegmentThresholds {
    fn default() -> Self {
        Self {
            repeat_min: 2,
            loyal_min: 4,
            vip_min: 10,
        }
    }
}

impl SegmentThresholds {
    pub fn classify(&self, total_orders: i64) -> Segment {
        if total_orders >= self.vip_min {
            Segment::Vip
        } else if total_orders >= self.loyal_min {
            Segment::Loyal
        } else if total_orders >= self.repeat_min {
            Segment::Repeat
        } else {
            Segment::New
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_classify_boundaries_upward() {
        let t = SegmentThresholds::default();
        assert_eq!(t.classify(1), Segment::New);
        assert_eq!(t.classify(2), Segment::Repeat);
        assert_eq!(t.classify(3), Segment::Repeat);
        assert_eq!(t.classify(4), Segment::Loyal);
        assert_eq!(t.classify(9), Segment::Loyal);
        assert_eq!(t.classify(10), Segment::Vip);
        assert_eq!(t.classify(250), Segment::Vip);
    }

    #[test]
    fn custom_thresholds_shift_segments() {
        let t = SegmentThresholds {
            repeat_min: 3,
            loyal_min: 6,
            vip_min: 20,
        };
        assert_eq!(t.classify(2), Segment::New);
        assert_eq!(t.classify(5), Segment::Repeat);
        assert_eq!(t.classify(19), Segment::Loyal);
    }
}
