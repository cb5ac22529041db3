//! Painter tuning knobs.

use crate::arc::DEFAULT_MAX_ARC_SEGMENTS;
use crate::basics::FillingRule;
use crate::curves::{DEFAULT_FLATNESS, DEFAULT_RECURSION_LIMIT};

/// Settings fixed for the lifetime of a [`Painter`](crate::painter::Painter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PainterConfig {
    /// Curve flattening tolerance, in device pixels.
    pub flatness: f64,
    /// Curve subdivision depth ceiling.
    pub max_flatten_depth: u32,
    /// Arc subdivision density multiplier.
    pub arc_approximation_scale: f64,
    pub max_arc_segments: u32,
    /// Pool slots per primitive kind before heap fallback.
    pub pool_capacity: usize,
    pub filling_rule: FillingRule,
    /// Initial capacity of both state stacks.
    pub stack_reserve: usize,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            flatness: DEFAULT_FLATNESS,
            max_flatten_depth: DEFAULT_RECURSION_LIMIT,
            arc_approximation_scale: 1.0,
            max_arc_segments: DEFAULT_MAX_ARC_SEGMENTS,
            pool_capacity: 16,
            filling_rule: FillingRule::NonZero,
            stack_reserve: 8,
        }
    }
}

impl PainterConfig {
    pub fn with_flatness(mut self, flatness: f64) -> Self {
        self.flatness = flatness;
        self
    }

    pub fn with_max_flatten_depth(mut self, depth: u32) -> Self {
        self.max_flatten_depth = depth;
        self
    }

    pub fn with_arc_approximation_scale(mut self, scale: f64) -> Self {
        self.arc_approximation_scale = scale;
        self
    }

    pub fn with_max_arc_segments(mut self, n: u32) -> Self {
        self.max_arc_segments = n;
        self
    }

    pub fn with_pool_capacity(mut self, n: usize) -> Self {
        self.pool_capacity = n;
        self
    }

    pub fn with_filling_rule(mut self, rule: FillingRule) -> Self {
        self.filling_rule = rule;
        self
    }

    pub fn with_stack_reserve(mut self, n: usize) -> Self {
        self.stack_reserve = n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = PainterConfig::default();
        assert_eq!(c.flatness, 0.25);
        assert_eq!(c.max_flatten_depth, 16);
        assert_eq!(c.max_arc_segments, 256);
        assert_eq!(c.pool_capacity, 16);
        assert_eq!(c.filling_rule, FillingRule::NonZero);
    }

    #[test]
    fn test_builders() {
        let c = PainterConfig::default()
            .with_flatness(0.1)
            .with_filling_rule(FillingRule::EvenOdd)
            .with_pool_capacity(2);
        assert_eq!(c.flatness, 0.1);
        assert_eq!(c.filling_rule, FillingRule::EvenOdd);
        assert_eq!(c.pool_capacity, 2);
    }
}
