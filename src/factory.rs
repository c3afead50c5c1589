//! Engine registry: look engines up by name or by the problem kind they must support.

use std::sync::Arc;

use log::debug;

use crate::{
    capability::CompilationKind,
    grounding::{Compiler, Grounder},
    model::ProblemKind,
    options::ValidatorOptions,
    solvers::{BreadthFirstPlanner, Planner},
    validation::{PlanValidator, SequentialPlanValidator},
    Error, Result,
};

/// Engines in registration order. Lookups by kind return the first engine whose capabilities
/// cover the kind.
#[derive(Clone)]
pub struct Factory {
    compilers: Vec<Arc<dyn Compiler>>,
    planners: Vec<Arc<dyn Planner>>,
    validators: Vec<Arc<dyn PlanValidator>>,
}

impl Default for Factory {
    /// The grounder, the breadth-first planner and the plan validator without then with metric
    /// support.
    fn default() -> Self {
        let mut factory = Self::empty();
        factory.add_compiler(Grounder::default());
        factory.add_planner(BreadthFirstPlanner::default());
        factory.add_plan_validator(SequentialPlanValidator::default());
        factory.add_plan_validator(SequentialPlanValidator::new(ValidatorOptions {
            evaluate_metrics: true,
        }));
        factory
    }
}

impl Factory {
    pub fn empty() -> Self {
        Self {
            compilers: Vec::new(),
            planners: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn add_compiler(&mut self, compiler: impl Compiler + 'static) {
        self.compilers.push(Arc::new(compiler));
    }

    pub fn add_planner(&mut self, planner: impl Planner + 'static) {
        self.planners.push(Arc::new(planner));
    }

    pub fn add_plan_validator(&mut self, validator: impl PlanValidator + 'static) {
        self.validators.push(Arc::new(validator));
    }

    pub fn compiler(&self, name: &str) -> Result<Arc<dyn Compiler>> {
        self.compilers
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| Error::unknown_engine(name))
    }

    /// A compiler offering `compilation` for problems of `kind`.
    pub fn compiler_for(
        &self,
        kind: &ProblemKind,
        compilation: CompilationKind,
    ) -> Result<Arc<dyn Compiler>> {
        self.compilers
            .iter()
            .find(|c| c.supports_compilation(compilation) && c.supports(kind))
            .cloned()
            .ok_or_else(|| Error::no_supporting_engine(&format!("{} compiler", compilation), kind))
    }

    pub fn planner(&self, name: &str) -> Result<Arc<dyn Planner>> {
        self.planners
            .iter()
            .find(|p| p.name() == name)
            .cloned()
            .ok_or_else(|| Error::unknown_engine(name))
    }

    pub fn oneshot_planner(&self, kind: &ProblemKind) -> Result<Arc<dyn Planner>> {
        let planner = self
            .planners
            .iter()
            .find(|p| p.supports(kind))
            .cloned()
            .ok_or_else(|| Error::no_supporting_engine("planner", kind))?;
        debug!("selected planner {} for {}", planner.name(), kind);
        Ok(planner)
    }

    pub fn plan_validator(&self, kind: &ProblemKind) -> Result<Arc<dyn PlanValidator>> {
        let validator = self
            .validators
            .iter()
            .find(|v| v.supports(kind))
            .cloned()
            .ok_or_else(|| Error::no_supporting_engine("plan validator", kind))?;
        debug!("selected validator {} for {}", validator.name(), kind);
        Ok(validator)
    }

    pub fn planner_names(&self) -> Vec<&str> {
        self.planners.iter().map(|p| p.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{examples, model::Feature};

    #[test]
    fn test_lookup_by_kind() {
        let factory = Factory::default();
        let classical = examples::basic().unwrap().kind();
        let with_costs = examples::basic_with_costs().unwrap().kind();

        assert_eq!(
            factory.plan_validator(&classical).unwrap().name(),
            SequentialPlanValidator::NAME
        );
        assert_eq!(
            factory.plan_validator(&with_costs).unwrap().name(),
            SequentialPlanValidator::NAME_WITH_METRICS
        );
        assert_eq!(
            factory.oneshot_planner(&with_costs).unwrap().name(),
            BreadthFirstPlanner::NAME
        );
        assert_eq!(
            factory
                .compiler_for(&classical, CompilationKind::Grounding)
                .unwrap()
                .name(),
            Grounder::NAME
        );
        assert!(matches!(
            factory.compiler_for(&classical, CompilationKind::QuantifiersRemoving),
            Err(Error::NoSupportingEngine(..))
        ));
        assert_eq!(factory.planner_names(), vec![BreadthFirstPlanner::NAME]);
    }

    #[test]
    fn test_lookup_by_name() {
        let mut factory = Factory::empty();
        assert!(matches!(
            factory.compiler(Grounder::NAME),
            Err(Error::UnknownEngine(_))
        ));
        factory.add_compiler(Grounder::default());
        assert!(factory.compiler(Grounder::NAME).is_ok());
        assert!(factory.planner(BreadthFirstPlanner::NAME).is_err());

        factory.add_plan_validator(SequentialPlanValidator::default());
        let mut kind = ProblemKind::new();
        kind.set(Feature::FinalValue);
        assert!(factory.plan_validator(&kind).is_err());
    }
}
