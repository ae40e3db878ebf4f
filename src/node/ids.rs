//! Synthetic id allocation for declarative nodes.

/// Allocator for the negative id range, scoped to one compile pass.
///
/// Declarative nodes are rebuilt on every compile, so their ids only need to
/// be unique within a pass. Owning the sequence here (instead of a process
/// global) keeps repeated compiles deterministic.
#[derive(Debug)]
pub struct SyntheticIds {
    next: i64,
}

impl SyntheticIds {
    pub fn new() -> Self {
        Self { next: -1 }
    }

    /// Hand out the next synthetic id, counting down from -1.
    pub fn next(&mut self) -> i64 {
        let id = self.next;
        self.next -= 1;
        id
    }
}

impl Default for SyntheticIds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_from_minus_one() {
        let mut ids = SyntheticIds::new();
        assert_eq!(ids.next(), -1);
        assert_eq!(ids.next(), -2);
        assert_eq!(ids.next(), -3);
    }

    #[test]
    fn test_fresh_allocator_restarts_sequence() {
        let mut first = SyntheticIds::new();
        first.next();
        first.next();
        let mut second = SyntheticIds::new();
        assert_eq!(second.next(), -1);
    }
}
