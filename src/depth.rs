/// Default bound on how deeply functions and parameters may nest.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Counts how many functions and parameters the reader is currently inside.
/// A push past `max` fails, which the reader reports as
/// [`Malformed::DepthExceeded`](crate::Malformed::DepthExceeded) before it
/// recurses again.
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) struct Depth {
    depth: usize,
    max: usize,
}

impl Depth {
    pub fn new(max: usize) -> Self {
        Depth { depth: 0, max }
    }

    pub fn push(&mut self) -> bool {
        if self.depth >= self.max {
            false
        } else {
            self.depth += 1;
            true
        }
    }

    pub fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_limit() {
        let mut depth = Depth::new(DEFAULT_MAX_DEPTH);

        // Popping an empty counter does not buy an extra level
        depth.pop();
        for _ in 0..DEFAULT_MAX_DEPTH {
            assert!(depth.push());
        }

        assert!(!depth.push());
        depth.pop();
        assert!(depth.push());
        assert!(!depth.push());
    }

    #[test]
    fn test_zero_depth() {
        let mut depth = Depth::new(0);
        assert!(!depth.push());
        assert_eq!(depth.max(), 0);
    }
}
