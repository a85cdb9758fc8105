//! Time normalization and the wall-clock capability.

use chrono::{DateTime, Utc};

/// Truncate a media timestamp toward zero to 3 decimal digits.
///
/// Every time that reaches the wire goes through this first. Values already
/// on the millisecond grid are kept as is, so truncation is idempotent.
pub fn truncate_time(value: f64) -> f64 {
    let scaled = value * 1000.0;
    let nearest = scaled.round();
    let scaled = if (scaled - nearest).abs() < 1e-6 {
        nearest
    } else {
        scaled
    };
    let truncated = scaled.trunc() / 1000.0;
    // -0.0 would encode as "-0".
    if truncated == 0.0 { 0.0 } else { truncated }
}

/// Source of wall-clock time. Enables fixed clocks in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Real clock backed by `Utc::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_three_digits() {
        assert_eq!(truncate_time(12.345_678), 12.345);
        assert_eq!(truncate_time(5.0), 5.0);
        assert_eq!(truncate_time(0.0009), 0.0);
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(truncate_time(1.9999), 1.999);
        assert_eq!(truncate_time(-1.9999), -1.999);
    }

    #[test]
    fn tiny_negative_truncates_to_positive_zero() {
        let t = truncate_time(-0.0001);
        assert_eq!(t, 0.0);
        assert!(t.is_sign_positive());
        assert_eq!(t.to_string(), "0");
        assert!(truncate_time(-0.0).is_sign_positive());
    }

    #[test]
    fn truncation_is_idempotent() {
        for v in [1.234, 0.15, 12.345, 99.999, 4.35, 1.005] {
            assert_eq!(truncate_time(v), v);
            assert_eq!(truncate_time(truncate_time(v)), v);
        }
    }

    #[test]
    fn blanket_ref_impl() {
        struct Fixed(DateTime<Utc>);
        impl Clock for Fixed {
            fn now(&self) -> DateTime<Utc> {
                self.0
            }
        }
        let at = DateTime::<Utc>::UNIX_EPOCH;
        let clock = Fixed(at);
        let r: &Fixed = &clock;
        assert_eq!(r.now(), at);
    }
}
