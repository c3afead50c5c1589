use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::{
    Action, EffectKind, Expr, Feature, Fluent, FluentInstance, FluentType, ModelError, Object,
    Parameter, ProblemKind, QualityMetric, State, TypeHierarchy, Universe, Value,
};

static NEXT_PROBLEM_ID: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    NEXT_PROBLEM_ID.fetch_add(1, Ordering::Relaxed)
}

/// A lifted (or, after grounding, ground) planning problem.
///
/// Every problem carries an instance id that is unique within the process. Cloning yields a new
/// id, so a clone is never mistaken for its source by identity-keyed caches.
#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(skip)]
    id: u64,
    name: String,
    types: TypeHierarchy,
    objects: Vec<Object>,
    fluents: Vec<Fluent>,
    #[serde(serialize_with = "serialize_entries")]
    initial_values: BTreeMap<FluentInstance, Value>,
    actions: Vec<Action>,
    goals: Vec<Expr>,
    quality_metrics: Vec<QualityMetric>,
}

impl Clone for Problem {
    fn clone(&self) -> Self {
        Self {
            id: next_id(),
            name: self.name.clone(),
            types: self.types.clone(),
            objects: self.objects.clone(),
            fluents: self.fluents.clone(),
            initial_values: self.initial_values.clone(),
            actions: self.actions.clone(),
            goals: self.goals.clone(),
            quality_metrics: self.quality_metrics.clone(),
        }
    }
}

impl Problem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            name: name.into(),
            types: TypeHierarchy::new(),
            objects: Vec::new(),
            fluents: Vec::new(),
            initial_values: BTreeMap::new(),
            actions: Vec::new(),
            goals: Vec::new(),
            quality_metrics: Vec::new(),
        }
    }

    /// A copy of the types, objects, fluents and initial values, without actions, goals or
    /// metrics.
    pub fn skeleton(&self, name: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            name: name.into(),
            types: self.types.clone(),
            objects: self.objects.clone(),
            fluents: self.fluents.clone(),
            initial_values: self.initial_values.clone(),
            actions: Vec::new(),
            goals: Vec::new(),
            quality_metrics: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn fluents(&self) -> &[Fluent] {
        &self.fluents
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn goals(&self) -> &[Expr] {
        &self.goals
    }

    pub fn quality_metrics(&self) -> &[QualityMetric] {
        &self.quality_metrics
    }

    pub fn explicit_initial_values(&self) -> &BTreeMap<FluentInstance, Value> {
        &self.initial_values
    }

    pub fn universe(&self) -> Universe<'_> {
        Universe::new(&self.types, &self.objects)
    }

    pub fn add_type(&mut self, name: &str, parent: Option<&str>) -> Result<(), ModelError> {
        self.types.declare(name, parent)
    }

    pub fn add_object(&mut self, name: &str, ty: &str) -> Result<(), ModelError> {
        if !self.types.contains(ty) {
            return Err(ModelError::UnknownType(ty.to_string()));
        }
        if self.objects.iter().any(|o| o.name == name) {
            return Err(ModelError::DuplicateObject(name.to_string()));
        }
        self.objects.push(Object::new(name, ty));
        Ok(())
    }

    pub fn add_objects(&mut self, names: &[&str], ty: &str) -> Result<(), ModelError> {
        names.iter().try_for_each(|n| self.add_object(n, ty))
    }

    pub fn object(&self, name: &str) -> Result<&Object, ModelError> {
        self.objects
            .iter()
            .find(|o| o.name == name)
            .ok_or_else(|| ModelError::UnknownObject(name.to_string()))
    }

    pub fn add_fluent(&mut self, fluent: Fluent) -> Result<(), ModelError> {
        if self.fluents.iter().any(|f| f.name == fluent.name) {
            return Err(ModelError::DuplicateFluent(fluent.name));
        }
        self.check_parameters(&fluent.signature)?;
        if let Some(d) = &fluent.default {
            if !fluent.accepts(d) {
                return Err(type_mismatch(&fluent.name, "default", &fluent.value_type, d));
            }
        }
        self.fluents.push(fluent);
        Ok(())
    }

    pub fn fluent(&self, name: &str) -> Result<&Fluent, ModelError> {
        self.fluents
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ModelError::UnknownFluent(name.to_string()))
    }

    fn check_parameters(&self, params: &[Parameter]) -> Result<(), ModelError> {
        match params.iter().find(|p| !self.types.contains(&p.ty)) {
            Some(p) => Err(ModelError::UnknownType(p.ty.clone())),
            None => Ok(()),
        }
    }

    /// Checks that `fi` names a declared fluent with arguments of compatible types.
    pub fn check_fluent_instance(&self, fi: &FluentInstance) -> Result<(), ModelError> {
        let fluent = self.fluent(&fi.fluent)?;
        self.check_typed_args(&fi.to_string(), &fluent.signature, &fi.args)
    }

    /// Checks that `args` fit the parameters of `action`.
    pub fn check_arguments<S: AsRef<str>>(
        &self,
        action: &Action,
        args: &[S],
    ) -> Result<(), ModelError> {
        self.check_typed_args(&action.name, &action.parameters, args)
    }

    fn check_typed_args<S: AsRef<str>>(
        &self,
        item: &str,
        params: &[Parameter],
        args: &[S],
    ) -> Result<(), ModelError> {
        if params.len() != args.len() {
            return Err(ModelError::ArityMismatch(item.to_string(), params.len(), args.len()));
        }
        for (p, a) in params.iter().zip(args) {
            let obj = self.object(a.as_ref())?;
            if !self.types.is_compatible(&obj.ty, &p.ty) {
                return Err(ModelError::TypeMismatch {
                    item: item.to_string(),
                    arg: obj.name.clone(),
                    expected: p.ty.clone(),
                    found: obj.ty.clone(),
                });
            }
        }
        Ok(())
    }

    /// Checks that every fluent in `expr` is declared and applied to arguments of compatible
    /// types, and that every variable is bound by `scope` or by an enclosing quantifier.
    pub fn check_expr(&self, expr: &Expr, scope: &[Parameter]) -> Result<(), ModelError> {
        let mut vars = scope
            .iter()
            .map(|p| (p.name.as_str(), p.ty.as_str()))
            .collect::<Vec<_>>();
        self.check_scoped(expr, &mut vars)
    }

    fn check_scoped<'a>(
        &self,
        expr: &'a Expr,
        vars: &mut Vec<(&'a str, &'a str)>,
    ) -> Result<(), ModelError> {
        match expr {
            Expr::Var(v) => {
                lookup(vars, v)?;
            }
            Expr::Object(o) => {
                self.object(o)?;
            }
            Expr::Fluent(name, args) => {
                let fluent = self.fluent(name)?;
                if args.len() != fluent.arity() {
                    return Err(ModelError::ArityMismatch(
                        name.clone(),
                        fluent.arity(),
                        args.len(),
                    ));
                }
                for (p, a) in fluent.signature.iter().zip(args) {
                    let (arg, ty) = match a {
                        Expr::Var(v) => (format!("?{}", v), lookup(vars, v)?),
                        Expr::Object(o) => (o.clone(), self.object(o)?.ty.as_str()),
                        _ => return Err(ModelError::NotObject(a.to_string())),
                    };
                    if !self.types.is_compatible(ty, &p.ty) {
                        return Err(ModelError::TypeMismatch {
                            item: expr.to_string(),
                            arg,
                            expected: p.ty.clone(),
                            found: ty.to_string(),
                        });
                    }
                }
            }
            Expr::Forall(params, body) | Expr::Exists(params, body) => {
                self.check_parameters(params)?;
                let n = vars.len();
                vars.extend(params.iter().map(|p| (p.name.as_str(), p.ty.as_str())));
                let checked = self.check_scoped(body, vars);
                vars.truncate(n);
                checked?;
            }
            _ => {
                for c in expr.children() {
                    self.check_scoped(c, vars)?;
                }
            }
        }
        Ok(())
    }

    pub fn set_initial_value(
        &mut self,
        fi: FluentInstance,
        value: impl Into<Value>,
    ) -> Result<(), ModelError> {
        let value = value.into();
        self.check_fluent_instance(&fi)?;
        let fluent = self.fluent(&fi.fluent)?;
        if !fluent.accepts(&value) {
            return Err(type_mismatch(&fi.to_string(), "value", &fluent.value_type, &value));
        }
        self.initial_values.insert(fi, value);
        Ok(())
    }

    /// Shorthand to set a list of boolean fluent instances to true.
    pub fn set_true(&mut self, fluent: &str, args: &[&str]) -> Result<(), ModelError> {
        self.set_initial_value(FluentInstance::new(fluent, args.iter().copied()), true)
    }

    pub fn add_action(&mut self, action: Action) -> Result<(), ModelError> {
        if self.actions.iter().any(|a| a.name == action.name) {
            return Err(ModelError::DuplicateAction(action.name));
        }
        self.check_parameters(&action.parameters)?;
        for c in &action.preconditions {
            self.check_expr(c, &action.parameters)?;
        }
        for e in &action.effects {
            let target = Expr::fluent(e.fluent.clone(), e.args.clone());
            self.check_expr(&target, &action.parameters)?;
            self.check_expr(&e.condition, &action.parameters)?;
            self.check_expr(&e.value, &action.parameters)?;
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn action(&self, name: &str) -> Result<&Action, ModelError> {
        self.actions
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| ModelError::UnknownAction(name.to_string()))
    }

    pub fn add_goal(&mut self, goal: Expr) -> Result<(), ModelError> {
        self.check_expr(&goal, &[])?;
        self.goals.push(goal);
        Ok(())
    }

    pub fn add_quality_metric(&mut self, metric: QualityMetric) {
        self.quality_metrics.push(metric);
    }

    pub fn clear_quality_metrics(&mut self) {
        self.quality_metrics.clear();
    }

    /// The initial state: explicit initial values that differ from their fluent's implicit value.
    pub fn initial_state(&self) -> State {
        let mut state = State::new();
        for (fi, v) in &self.initial_values {
            let implicit = self.fluent(&fi.fluent).ok().and_then(Fluent::implicit_value);
            state.put(fi.clone(), v.clone(), implicit.as_ref());
        }
        state
    }

    /// Fluents that no action effect writes.
    pub fn static_fluents(&self) -> HashSet<String> {
        let written = self
            .actions
            .iter()
            .flat_map(|a| a.effects.iter().map(|e| e.fluent.as_str()))
            .collect::<HashSet<_>>();
        self.fluents
            .iter()
            .filter(|f| !written.contains(f.name.as_str()))
            .map(|f| f.name.clone())
            .collect()
    }

    /// The features this problem uses.
    pub fn kind(&self) -> ProblemKind {
        let mut kind = ProblemKind::new();
        kind.set(Feature::ActionBased);
        if !self.types.is_empty() {
            kind.set(Feature::FlatTyping);
        }
        if self.types.is_hierarchical() {
            kind.set(Feature::HierarchicalTyping);
        }
        if self.fluents.iter().any(|f| f.value_type == FluentType::Numeric) {
            kind.set(Feature::NumericFluents);
        }
        let conditions = self
            .actions
            .iter()
            .flat_map(|a| a.preconditions.iter().chain(a.effects.iter().map(|e| &e.condition)))
            .chain(self.goals.iter());
        for c in conditions {
            condition_features(c, &mut kind);
        }
        for e in self.actions.iter().flat_map(|a| a.effects.iter()) {
            if e.is_conditional() {
                kind.set(Feature::ConditionalEffects);
            }
            match e.kind {
                EffectKind::Increase => kind.set(Feature::IncreaseEffects),
                EffectKind::Decrease => kind.set(Feature::DecreaseEffects),
                EffectKind::Assign => {}
            }
        }
        for m in &self.quality_metrics {
            kind.set(m.feature());
        }
        kind
    }

    /// Digest of the problem's structure. Problems with equal content share a fingerprint.
    pub fn fingerprint(&self) -> Result<String, ModelError> {
        let json = serde_json::to_string(self)?;
        Ok(hex::encode(Sha256::digest(json.as_bytes())))
    }
}

/// The type of the innermost binding of `var`.
fn lookup<'a>(vars: &[(&'a str, &'a str)], var: &str) -> Result<&'a str, ModelError> {
    vars.iter()
        .rev()
        .find(|(name, _)| *name == var)
        .map(|(_, ty)| *ty)
        .ok_or_else(|| ModelError::UnboundVariable(var.to_string()))
}

fn condition_features(expr: &Expr, kind: &mut ProblemKind) {
    match expr {
        Expr::Not(_) => kind.set(Feature::NegativeConditions),
        Expr::Or(_) | Expr::Implies(..) | Expr::Iff(..) => kind.set(Feature::DisjunctiveConditions),
        Expr::Equals(..) => kind.set(Feature::Equalities),
        Expr::Forall(..) => kind.set(Feature::UniversalConditions),
        Expr::Exists(..) => kind.set(Feature::ExistentialConditions),
        _ => {}
    }
    for c in expr.children() {
        condition_features(c, kind);
    }
}

// JSON maps need string keys, so initial values serialize as a list of pairs.
fn serialize_entries<S: serde::Serializer>(
    map: &BTreeMap<FluentInstance, Value>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_seq(map.iter())
}

fn type_mismatch(item: &str, arg: &str, expected: &FluentType, found: &Value) -> ModelError {
    ModelError::TypeMismatch {
        item: item.to_string(),
        arg: arg.to_string(),
        expected: format!("{:?}", expected),
        found: found.to_string(),
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "problem name = {}", self.name)?;
        writeln!(f, "types = [{}]", self.types.names().collect::<Vec<_>>().join(", "))?;
        writeln!(f, "objects = [")?;
        for o in &self.objects {
            writeln!(f, "  {}", o)?;
        }
        writeln!(f, "]")?;
        writeln!(f, "actions = [")?;
        for a in &self.actions {
            writeln!(f, "  {}", a)?;
        }
        writeln!(f, "]")?;
        writeln!(f, "initial values = [")?;
        for (fi, v) in &self.initial_values {
            writeln!(f, "  {} := {}", fi, v)?;
        }
        writeln!(f, "]")?;
        writeln!(f, "goals = [")?;
        for g in &self.goals {
            writeln!(f, "  {}", g)?;
        }
        writeln!(f, "]")?;
        for m in &self.quality_metrics {
            writeln!(f, "metric = {}", m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{examples, model::Effect};

    #[test]
    fn test_kind_of_quantified_blocks() {
        let problem = examples::blocks_forall().unwrap();
        let kind = problem.kind();
        assert!(kind.has(Feature::UniversalConditions));
        assert!(kind.has(Feature::HierarchicalTyping));
        assert!(kind.has(Feature::NegativeConditions));
        assert!(kind.has(Feature::Equalities));
        assert!(!kind.has(Feature::ExistentialConditions));
        assert!(!kind.has(Feature::NumericFluents));
        assert!(!kind.has_metrics());
    }

    #[test]
    fn test_instance_type_checks() {
        let mut problem = examples::logistics().unwrap();
        let err = problem
            .set_initial_value(FluentInstance::new("in", ["t1", "p1"]), true)
            .unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { .. }));
        let err = problem
            .set_initial_value(FluentInstance::new("in", ["p1"]), true)
            .unwrap_err();
        assert!(matches!(err, ModelError::ArityMismatch(_, 2, 1)));
        let err = problem
            .set_initial_value(FluentInstance::new("in", ["p1", "t1"]), 3)
            .unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { .. }));
        assert!(matches!(
            problem.set_initial_value(FluentInstance::new("in", ["p1", "t9"]), true),
            Err(ModelError::UnknownObject(_))
        ));
        assert!(matches!(
            problem.add_object("p1", "package"),
            Err(ModelError::DuplicateObject(_))
        ));
    }

    fn lift_problem() -> Problem {
        let mut problem = Problem::new("lift");
        problem.add_type("thing", None).unwrap();
        problem.add_type("block", Some("thing")).unwrap();
        problem.add_object("a", "block").unwrap();
        problem.add_object("t", "thing").unwrap();
        problem
            .add_fluent(Fluent::boolean("heavy", vec![Parameter::new("x", "block")]))
            .unwrap();
        problem
            .add_fluent(Fluent::boolean("held", vec![Parameter::new("x", "thing")]))
            .unwrap();
        problem
    }

    #[test]
    fn test_actions_are_checked_structurally() {
        let mut problem = lift_problem();
        let thing = || vec![Parameter::new("x", "thing")];
        let x = || Expr::var("x");

        let free =
            Action::new("free", thing()).precondition(Expr::fluent("held", vec![Expr::var("q")]));
        assert!(matches!(
            problem.add_action(free),
            Err(ModelError::UnboundVariable(v)) if v == "q"
        ));
        let unknown = Action::new("unknown", thing())
            .precondition(Expr::not(Expr::fluent("nope", vec![x()])));
        assert!(matches!(problem.add_action(unknown), Err(ModelError::UnknownFluent(_))));
        let arity = Action::new("arity", thing()).precondition(Expr::fluent("held", vec![]));
        assert!(matches!(
            problem.add_action(arity),
            Err(ModelError::ArityMismatch(_, 1, 0))
        ));
        // heavy takes a block, x may be any thing
        let ill_typed = Action::new("lift", thing())
            .precondition(Expr::not(Expr::fluent("heavy", vec![x()])));
        assert!(matches!(
            problem.add_action(ill_typed),
            Err(ModelError::TypeMismatch { .. })
        ));
        let object = Action::new("lift_t", vec![])
            .effect(Effect::assign("heavy", vec![Expr::obj("t")], true));
        assert!(matches!(
            problem.add_action(object),
            Err(ModelError::TypeMismatch { .. })
        ));
        let condition = Action::new("when", thing()).effect(
            Effect::assign("held", vec![x()], true)
                .when(Expr::fluent("held", vec![Expr::var("y")])),
        );
        assert!(matches!(
            problem.add_action(condition),
            Err(ModelError::UnboundVariable(_))
        ));
        assert!(problem.actions().is_empty());

        // quantified variables are in scope inside their body only
        let quantified = Action::new("lift", vec![Parameter::new("x", "block")])
            .precondition(Expr::not(Expr::fluent("heavy", vec![x()])))
            .precondition(Expr::forall(
                vec![Parameter::new("y", "thing")],
                Expr::not(Expr::fluent("held", vec![Expr::var("y")])),
            ))
            .effect(Effect::assign("held", vec![x()], true));
        problem.add_action(quantified).unwrap();
        let escaped = Action::new("escaped", vec![]).precondition(Expr::and(vec![
            Expr::exists(
                vec![Parameter::new("y", "block")],
                Expr::fluent("heavy", vec![Expr::var("y")]),
            ),
            Expr::fluent("held", vec![Expr::var("y")]),
        ]));
        assert!(matches!(
            problem.add_action(escaped),
            Err(ModelError::UnboundVariable(_))
        ));
        assert_eq!(problem.actions().len(), 1);
    }

    #[test]
    fn test_goals_are_checked_structurally() {
        let mut problem = lift_problem();
        assert!(matches!(
            problem.add_goal(Expr::fluent("held", vec![Expr::var("x")])),
            Err(ModelError::UnboundVariable(_))
        ));
        assert!(matches!(
            problem.add_goal(Expr::fluent("heavy", vec![Expr::obj("t")])),
            Err(ModelError::TypeMismatch { .. })
        ));
        assert!(matches!(
            problem.add_goal(Expr::fluent("held", vec![Expr::obj("z")])),
            Err(ModelError::UnknownObject(_))
        ));
        assert!(matches!(
            problem.add_goal(Expr::fluent("held", vec![Expr::int(1)])),
            Err(ModelError::NotObject(_))
        ));
        assert!(matches!(
            problem.add_goal(Expr::exists(
                vec![Parameter::new("y", "ghost")],
                Expr::fluent("held", vec![Expr::var("y")]),
            )),
            Err(ModelError::UnknownType(_))
        ));
        assert!(problem.goals().is_empty());
        problem
            .add_goal(Expr::exists(
                vec![Parameter::new("y", "block")],
                Expr::fluent("heavy", vec![Expr::var("y")]),
            ))
            .unwrap();
        assert_eq!(problem.goals().len(), 1);
    }

    #[test]
    fn test_clone_has_fresh_identity_and_same_fingerprint() {
        let problem = examples::basic_with_costs().unwrap();
        let mut clone = problem.clone();
        assert_ne!(problem.id(), clone.id());
        assert_eq!(problem.fingerprint().unwrap(), clone.fingerprint().unwrap());
        clone.clear_quality_metrics();
        assert_ne!(problem.fingerprint().unwrap(), clone.fingerprint().unwrap());
        assert!(problem.kind().has(Feature::ActionsCost));
        assert!(!clone.kind().has(Feature::ActionsCost));
    }

    #[test]
    fn test_static_fluents_and_initial_state() {
        let problem = examples::logistics().unwrap();
        let statics = problem.static_fluents();
        assert_eq!(statics, HashSet::from(["road".to_string()]));
        let state = problem.initial_state();
        assert_eq!(
            state.get(&FluentInstance::new("at", ["t1", "l1"])),
            Some(&Value::Bool(true))
        );
        assert_eq!(state.get(&FluentInstance::new("at", ["t1", "l2"])), None);
    }
}
