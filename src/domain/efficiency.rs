use super::errors::DomainError;
use super::load_group::LoadGroup;
use super::sample::LoadLevel;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyPoint {
    pub load_level: LoadLevel,
    pub mean_cpu: f64,
    /// load_level / mean_cpu
    pub raw_efficiency: f64,
    /// raw_efficiency relative to the smallest load level
    pub normalized_efficiency: f64,
}

/// Derives scaling efficiency from per-group mean CPU usage.
///
/// The smallest load level is the baseline and always normalizes to exactly 1.0.
/// A zero divisor anywhere is reported as a [`DomainError`] rather than
/// producing infinities in the output.
pub struct EfficiencyCalculator;

impl EfficiencyCalculator {
    pub fn calculate(groups: &[LoadGroup]) -> Result<Vec<EfficiencyPoint>, DomainError> {
        let mut ordered: Vec<&LoadGroup> = groups.iter().collect();
        ordered.sort_by_key(|g| g.load_level);

        let mut raw = Vec::with_capacity(ordered.len());
        for group in &ordered {
            raw.push(Self::raw_efficiency(group.load_level, group.mean_cpu)?);
        }

        let Some((baseline, &baseline_raw)) = ordered.first().zip(raw.first()) else {
            return Ok(Vec::new());
        };
        if baseline_raw == 0.0 {
            return Err(DomainError::ZeroBaselineEfficiency {
                load_level: baseline.load_level,
            });
        }

        ordered
            .iter()
            .zip(raw)
            .enumerate()
            .map(|(i, (group, raw_efficiency))| {
                let normalized_efficiency = if i == 0 {
                    1.0
                } else {
                    raw_efficiency / baseline_raw
                };
                if !normalized_efficiency.is_finite() {
                    return Err(DomainError::NonFiniteEfficiency {
                        load_level: group.load_level,
                    });
                }
                Ok(EfficiencyPoint {
                    load_level: group.load_level,
                    mean_cpu: group.mean_cpu,
                    raw_efficiency,
                    normalized_efficiency,
                })
            })
            .collect()
    }

    fn raw_efficiency(load_level: LoadLevel, mean_cpu: f64) -> Result<f64, DomainError> {
        if mean_cpu == 0.0 {
            return Err(DomainError::ZeroMeanCpu { load_level });
        }
        let raw = f64::from(load_level) / mean_cpu;
        if !raw.is_finite() {
            return Err(DomainError::NonFiniteEfficiency { load_level });
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(load_level: LoadLevel, mean_cpu: f64) -> LoadGroup {
        LoadGroup {
            load_level,
            rows: Vec::new(),
            mean_cpu,
            mean_memory: 0.0,
            sample_count: 1,
            source_count: 1,
        }
    }

    #[test]
    fn test_baseline_normalizes_to_one() {
        let groups = vec![group(30, 17.3), group(10, 11.1), group(200, 63.9)];
        let points = EfficiencyCalculator::calculate(&groups).unwrap();

        assert_eq!(points[0].load_level, 10);
        assert_eq!(points[0].normalized_efficiency, 1.0);
        assert!(
            points
                .windows(2)
                .all(|w| w[0].load_level < w[1].load_level)
        );
    }

    #[test]
    fn test_two_level_example() {
        let groups = vec![group(10, 20.0), group(100, 40.0)];
        let points = EfficiencyCalculator::calculate(&groups).unwrap();

        assert_eq!(points[0].raw_efficiency, 0.5);
        assert_eq!(points[0].normalized_efficiency, 1.0);
        assert_eq!(points[1].raw_efficiency, 2.5);
        assert_eq!(points[1].normalized_efficiency, 5.0);
    }

    #[test]
    fn test_zero_mean_cpu_is_domain_error() {
        let groups = vec![group(10, 20.0), group(50, 0.0)];
        let err = EfficiencyCalculator::calculate(&groups).unwrap_err();
        assert!(matches!(err, DomainError::ZeroMeanCpu { load_level: 50 }));
    }

    #[test]
    fn test_zero_mean_cpu_at_baseline_is_domain_error() {
        let groups = vec![group(10, 0.0), group(50, 12.0)];
        let err = EfficiencyCalculator::calculate(&groups).unwrap_err();
        assert!(matches!(err, DomainError::ZeroMeanCpu { load_level: 10 }));
    }

    #[test]
    fn test_zero_load_baseline_is_domain_error() {
        let groups = vec![group(0, 5.0), group(50, 12.0)];
        let err = EfficiencyCalculator::calculate(&groups).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ZeroBaselineEfficiency { load_level: 0 }
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(EfficiencyCalculator::calculate(&[]).unwrap().is_empty());
    }
}
