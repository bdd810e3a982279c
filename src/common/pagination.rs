// src/common/pagination.rs

// Limite efetivo das listagens: o que o cliente pediu, limitado ao teto.
pub fn effective_limit(requested: Option<i64>, fallback: i64, max: i64) -> i64 {
    requested.unwrap_or(fallback).clamp(1, max)
}

pub fn effective_offset(requested: Option<i64>) -> i64 {
    requested.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_fallback_when_missing() {
        assert_eq!(effective_limit(None, 50, 200), 50);
    }

    #[test]
    fn clamps_to_max() {
        assert_eq!(effective_limit(Some(10_000), 50, 200), 200);
    }

    #[test]
    fn rejects_non_positive() {
        assert_eq!(effective_limit(Some(0), 50, 200), 1);
        assert_eq!(effective_offset(Some(-5)), 0);
    }
}
