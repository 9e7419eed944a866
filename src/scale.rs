use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

/// Maps a numeric domain onto a pixel range. A degenerate domain collapses
/// to the midpoint of the range instead of dividing by zero.
#[derive(Clone, Copy, Debug)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// Builds the domain from the min/max of `values`. Deriving a domain
    /// from an empty set has no meaning and is reported as an error rather
    /// than defaulting to a flat `[0, 0]`.
    pub fn fit(values: impl IntoIterator<Item = f64>, range: (f32, f32)) -> Result<Self> {
        Ok(Self::new(domain_extent(values)?, range))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn set_domain(&mut self, domain: (f64, f64)) {
        self.domain = domain;
    }

    pub fn scale(&self, value: f64) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.abs() < f64::EPSILON {
            return (r0 + r1) * 0.5;
        }
        let t = (value - d0) / span;
        r0 + ((r1 - r0) * t as f32)
    }

    /// Roughly `count` round-valued ticks covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        let span = hi - lo;
        if span <= 0.0 || count == 0 {
            return vec![lo];
        }

        let raw_step = span / count as f64;
        let power = 10f64.powf(raw_step.log10().floor());
        let error = raw_step / power;
        let factor = if error >= 50f64.sqrt() {
            10.0
        } else if error >= 10f64.sqrt() {
            5.0
        } else if error >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };
        let step = power * factor;

        let mut ticks = Vec::new();
        let mut value = (lo / step).ceil() * step;
        while value <= hi + (step * 1e-9) {
            ticks.push(value);
            value += step;
        }
        ticks
    }
}

/// A linear scale over timestamps, expressed in milliseconds since the epoch.
#[derive(Clone, Copy, Debug)]
pub struct TimeScale {
    inner: LinearScale,
}

impl TimeScale {
    pub fn new(domain: (DateTime<Utc>, DateTime<Utc>), range: (f32, f32)) -> Self {
        Self {
            inner: LinearScale::new(
                (
                    domain.0.timestamp_millis() as f64,
                    domain.1.timestamp_millis() as f64,
                ),
                range,
            ),
        }
    }

    pub fn fit(
        values: impl IntoIterator<Item = DateTime<Utc>>,
        range: (f32, f32),
    ) -> Result<Self> {
        let domain = domain_extent(values)?;
        Ok(Self::new(domain, range))
    }

    pub fn scale(&self, at: DateTime<Utc>) -> f32 {
        self.inner.scale(at.timestamp_millis() as f64)
    }

    /// Evenly spaced instants across the domain, endpoints included.
    pub fn ticks(&self, count: usize) -> Vec<DateTime<Utc>> {
        let (d0, d1) = self.inner.domain();
        let count = count.max(1);
        (0..=count)
            .filter_map(|i| {
                let t = d0 + ((d1 - d0) * (i as f64 / count as f64));
                DateTime::<Utc>::from_timestamp_millis(t as i64)
            })
            .collect()
    }
}

/// Positions discrete keys at evenly spaced band centers within the range.
#[derive(Clone, Debug)]
pub struct BandScale {
    keys: Vec<String>,
    range: (f32, f32),
}

impl BandScale {
    pub fn new(keys: impl IntoIterator<Item = String>, range: (f32, f32)) -> Result<Self> {
        let keys = keys.into_iter().collect::<Vec<_>>();
        if keys.is_empty() {
            return Err(anyhow!("cannot build a band scale over an empty key set"));
        }
        Ok(Self { keys, range })
    }

    pub fn bandwidth(&self) -> f32 {
        (self.range.1 - self.range.0) / self.keys.len() as f32
    }

    pub fn position(&self, key: &str) -> Option<f32> {
        let index = self.keys.iter().position(|known| known == key)?;
        Some(self.range.0 + (self.bandwidth() * (index as f32 + 0.5)))
    }
}

/// Min/max over any partially ordered values; empty input is an error
/// (spurious `[0, 0]` domains render misleading flat charts).
pub fn domain_extent<T>(values: impl IntoIterator<Item = T>) -> Result<(T, T)>
where
    T: PartialOrd + Copy,
{
    let mut iter = values.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| anyhow!("cannot derive a scale domain from an empty set"))?;
    let mut min = first;
    let mut max = first;
    for value in iter {
        if value < min {
            min = value;
        }
        if value > max {
            max = value;
        }
    }
    Ok((min, max))
}
