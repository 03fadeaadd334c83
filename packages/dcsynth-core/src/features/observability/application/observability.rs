use crate::config::InferenceConfig;
use crate::errors::Result;
use crate::features::automaton::Automaton;
use crate::features::observability::domain::ObservabilityReport;
use tracing::info;

impl Automaton {
    /// Full observability report: verdict, optional ambiguity level and a
    /// shortest witness run for every unconditional violation
    pub fn observability_report(
        &self,
        compute_ambiguity_level: bool,
        config: &InferenceConfig,
    ) -> Result<ObservabilityReport> {
        let mut ustructure = self.synchronized_composition()?;
        let ambiguity_level = if compute_ambiguity_level {
            ustructure.analyze_control_configurations(config)?
        } else {
            None
        };

        let violations = ustructure.unconditional_violations().to_vec();
        let witnesses = violations
            .iter()
            .filter_map(|v| ustructure.witness(v))
            .collect();

        info!(
            violations = violations.len(),
            level = ?ambiguity_level,
            "observability tested"
        );
        Ok(ObservabilityReport {
            observable: violations.is_empty(),
            ambiguity_level,
            unconditional_violations: violations,
            witnesses,
        })
    }

    /// `(observable, ambiguity level)` with the default round cap
    pub fn test_observability(&self, compute_ambiguity_level: bool) -> Result<(bool, Option<u32>)> {
        let report = self.observability_report(compute_ambiguity_level, &InferenceConfig::default())?;
        Ok((report.observable, report.ambiguity_level))
    }
}

#[cfg(test)]
mod tests {
    use crate::features::automaton::TextFormat;

    #[test]
    fn test_observable_plant() {
        // The single controller sees everything
        let plant = TextFormat::parse(1, "@1,F\n2,F\n3,F", "a,T,F\nb,T,T", "1,a,2\n2,b,3:BAD").unwrap();
        let (observable, level) = plant.test_observability(true).unwrap();
        assert!(observable);
        assert_eq!(level, Some(0));
    }

    #[test]
    fn test_unobservable_plant_has_witness() {
        let plant = TextFormat::parse(
            2,
            "@1,F\n2,F\n3,F\n4,F",
            "u,TF,FF\nc,TT,FT",
            "1,u,2\n1,c,3\n2,c,4:BAD",
        )
        .unwrap();
        let report = plant
            .observability_report(false, &Default::default())
            .unwrap();
        assert!(!report.observable);
        assert_eq!(report.ambiguity_level, None);
        assert_eq!(report.witnesses.len(), report.n_violations());
        assert!(report.witnesses.iter().all(|w| !w.is_empty()));
    }
}
