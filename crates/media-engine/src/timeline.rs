//! The book's segments laid end to end as one continuous timeline

use audioreader_core::AudioSegment;

/// Seeks never land closer than this to the end of the book, in seconds
pub const SEEK_END_EPSILON: f64 = 0.1;

/// A global time resolved to one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPosition {
    pub index: usize,
    /// Time within the segment, in seconds
    pub local_time: f64,
}

#[derive(Debug, Clone)]
pub struct SegmentTimeline {
    segments: Vec<AudioSegment>,
    total_duration: f64,
}

impl SegmentTimeline {
    /// Segments must be non-empty, sorted and contiguous (checked at load time)
    pub fn new(segments: Vec<AudioSegment>, total_duration: f64) -> Self {
        Self {
            segments,
            total_duration,
        }
    }

    pub fn segments(&self) -> &[AudioSegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Clamps a global time into `[0, total_duration - SEEK_END_EPSILON]`
    pub fn clamp(&self, t: f64) -> f64 {
        let upper = (self.total_duration - SEEK_END_EPSILON).max(0.0);
        if t.is_nan() {
            return 0.0;
        }
        t.clamp(0.0, upper)
    }

    /// Resolves a global time to the last segment starting at or before it
    pub fn global_to_segment(&self, t: f64) -> SegmentPosition {
        let t = self.clamp(t);
        let index = self
            .segments
            .partition_point(|seg| seg.offset <= t)
            .saturating_sub(1);
        let offset = self.segments.get(index).map_or(0.0, |seg| seg.offset);

        SegmentPosition {
            index,
            local_time: t - offset,
        }
    }

    /// Maps a segment-local time back onto the global timeline
    pub fn to_global(&self, index: usize, local_time: f64) -> f64 {
        self.segments
            .get(index)
            .map_or(local_time, |seg| seg.offset + local_time)
    }

    /// Progress through the book, 0 - 100
    pub fn percent(&self, t: f64) -> f64 {
        if self.total_duration <= 0.0 || t.is_nan() {
            return 0.0;
        }
        (t / self.total_duration * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_part() -> SegmentTimeline {
        SegmentTimeline::new(
            vec![
                AudioSegment::new("1.m4b", 0.0, 120.0),
                AudioSegment::new("2.m4b", 120.0, 180.0),
                AudioSegment::new("3.m4b", 300.0, 150.0),
            ],
            450.0,
        )
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_resolution_inside_first_segment() {
        let pos = three_part().global_to_segment(119.9);
        assert_eq!(pos.index, 0);
        assert_close(pos.local_time, 119.9);
    }

    #[test]
    fn test_resolution_on_boundary_picks_later_segment() {
        let pos = three_part().global_to_segment(120.0);
        assert_eq!(pos.index, 1);
        assert_close(pos.local_time, 0.0);
    }

    #[test]
    fn test_resolution_near_end() {
        let pos = three_part().global_to_segment(449.9);
        assert_eq!(pos.index, 2);
        assert_close(pos.local_time, 149.9);
    }

    #[test]
    fn test_clamp() {
        let timeline = three_part();
        assert_eq!(timeline.clamp(-5.0), 0.0);
        assert_close(timeline.clamp(1450.0), 450.0 - SEEK_END_EPSILON);
        assert_eq!(timeline.clamp(f64::NAN), 0.0);
    }

    #[test]
    fn test_out_of_range_resolves_into_last_segment() {
        let pos = three_part().global_to_segment(10_000.0);
        assert_eq!(pos.index, 2);
        assert_close(pos.local_time, 150.0 - SEEK_END_EPSILON);
    }

    #[test]
    fn test_to_global_inverts_resolution() {
        let timeline = three_part();
        for t in [0.0, 57.3, 120.0, 299.99, 301.5, 440.0] {
            let pos = timeline.global_to_segment(t);
            assert_close(timeline.to_global(pos.index, pos.local_time), t);
        }
    }

    #[test]
    fn test_percent() {
        let timeline = three_part();
        assert_eq!(timeline.percent(0.0), 0.0);
        assert_close(timeline.percent(225.0), 50.0);
        assert_eq!(timeline.percent(900.0), 100.0);
    }

    #[test]
    fn test_tiny_book_clamps_to_zero() {
        let timeline = SegmentTimeline::new(vec![AudioSegment::new("a", 0.0, 0.05)], 0.05);
        assert_eq!(timeline.clamp(1.0), 0.0);
    }
}
