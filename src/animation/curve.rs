/// Scalar keyframe curve. `times` are ascending and `keys` holds one value
/// per time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    pub times: Vec<f32>,
    pub keys: Vec<f32>,
}
impl Curve {
    pub fn new(times: Vec<f32>, keys: Vec<f32>) -> Self {
        debug_assert_eq!(times.len(), keys.len());
        Self { times, keys }
    }

    pub fn constant(value: f32) -> Self {
        Self { times: vec![0.0], keys: vec![value] }
    }

    pub fn len(&self) -> usize {
        self.times.len().min(self.keys.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear interpolation between the surrounding keys, clamped to the
    /// first and last key outside the keyed range. `None` for an empty curve.
    pub fn sample(&self, time: f32) -> Option<f32> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        if n == 1 || time <= self.times[0] {
            return Some(self.keys[0]);
        }
        if time >= self.times[n - 1] {
            return Some(self.keys[n - 1]);
        }

        // last key at or before `time`, kept below the final key
        let i0 = self.times[..n].partition_point(|&t| t <= time).saturating_sub(1).min(n - 2);
        let (t0, t1) = (self.times[i0], self.times[i0 + 1]);
        let (v0, v1) = (self.keys[i0], self.keys[i0 + 1]);
        let alpha = if (t1 - t0).abs() < f32::EPSILON {
            0.0
        } else {
            (time - t0) / (t1 - t0)
        };
        Some(v0 + (v1 - v0) * alpha)
    }

    /// Like [`Curve::sample`], with 0 for an empty curve.
    pub fn value(&self, time: f32) -> f32 {
        self.sample(time).unwrap_or(0.0)
    }

    pub fn end_time(&self) -> Option<f32> {
        self.times[..self.len()].iter().copied().reduce(f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tent() -> Curve {
        Curve::new(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 0.0])
    }

    #[test]
    fn interpolates_between_keys() {
        let curve = tent();
        assert_eq!(curve.value(0.5), 5.0);
        assert_eq!(curve.value(1.5), 5.0);
        assert_eq!(curve.value(1.0), 10.0);
        assert_eq!(curve.value(0.25), 2.5);
    }

    #[test]
    fn clamps_outside_keyed_range() {
        let curve = tent();
        assert_eq!(curve.value(-1.0), 0.0);
        assert_eq!(curve.value(5.0), 0.0);
        assert_eq!(curve.value(2.0), 0.0);

        let ramp = Curve::new(vec![1.0, 3.0], vec![2.0, 4.0]);
        assert_eq!(ramp.value(0.0), 2.0);
        assert_eq!(ramp.value(10.0), 4.0);
    }

    #[test]
    fn single_key_is_constant() {
        let curve = Curve::constant(3.5);
        for t in [-10.0, 0.0, 0.5, 100.0] {
            assert_eq!(curve.value(t), 3.5);
        }
    }

    #[test]
    fn empty_curve_has_no_value() {
        let curve = Curve::default();
        assert!(curve.is_empty());
        assert_eq!(curve.sample(1.0), None);
        assert_eq!(curve.value(1.0), 0.0);
        assert_eq!(curve.end_time(), None);
    }

    #[test]
    fn coincident_keys_do_not_divide_by_zero() {
        let curve = Curve::new(vec![0.0, 1.0, 1.0, 2.0], vec![0.0, 1.0, 5.0, 5.0]);
        for i in 0..=40 {
            assert!(curve.value(i as f32 * 0.05).is_finite());
        }
        assert_eq!(curve.value(1.5), 5.0);
    }

    #[test]
    fn stays_within_neighbouring_keys() {
        let curve = Curve::new(vec![0.0, 0.5, 2.0, 3.0], vec![1.0, -2.0, 4.0, 4.0]);
        for i in 0..300 {
            let t = i as f32 * 0.01;
            let v = curve.value(t);
            let k = curve.times.partition_point(|&x| x <= t).clamp(1, 3) - 1;
            let (lo, hi) = (curve.keys[k].min(curve.keys[k + 1]), curve.keys[k].max(curve.keys[k + 1]));
            assert!(v >= lo - 1e-5 && v <= hi + 1e-5, "t={t} v={v}");
        }
        assert_eq!(curve.end_time(), Some(3.0));
    }
}
