//! Finite-domain enumeration of typed bindings.
//!
//! Both the grounder (action parameters, quantifier elimination) and the evaluator (direct
//! quantifier evaluation) draw their bindings from [`Universe::bindings`], so the two always
//! agree on the domain and order of enumeration.

use itertools::Itertools;

use super::{bind, Expr, ModelError, Object, Parameter, TypeHierarchy};

#[derive(Clone, Copy)]
pub struct Universe<'a> {
    types: &'a TypeHierarchy,
    objects: &'a [Object],
}

impl<'a> Universe<'a> {
    pub fn new(types: &'a TypeHierarchy, objects: &'a [Object]) -> Self {
        Self { types, objects }
    }

    /// Objects whose type is `ty` or one of its subtypes, in declaration order.
    pub fn objects_of(&self, ty: &str) -> Result<Vec<&'a Object>, ModelError> {
        if !self.types.contains(ty) {
            return Err(ModelError::UnknownType(ty.to_string()));
        }
        Ok(self
            .objects
            .iter()
            .filter(|o| self.types.is_compatible(&o.ty, ty))
            .collect())
    }

    /// Number of bindings `bindings(params)` yields.
    pub fn count_bindings(&self, params: &[Parameter]) -> Result<usize, ModelError> {
        params.iter().try_fold(1usize, |acc, p| {
            Ok(acc.saturating_mul(self.objects_of(&p.ty)?.len()))
        })
    }

    /// Every tuple of objects compatible with `params`, in lexicographic order of the objects'
    /// declaration positions. No parameters yield exactly one empty tuple.
    pub fn bindings(
        &self,
        params: &[Parameter],
    ) -> Result<Box<dyn Iterator<Item = Vec<&'a Object>> + 'a>, ModelError> {
        if params.is_empty() {
            return Ok(Box::new(std::iter::once(Vec::new())));
        }
        let domains = params
            .iter()
            .map(|p| self.objects_of(&p.ty))
            .collect::<Result<Vec<_>, _>>()?;
        if domains.iter().any(|d| d.is_empty()) {
            return Ok(Box::new(std::iter::empty()));
        }
        Ok(Box::new(
            domains.into_iter().map(|d| d.into_iter()).multi_cartesian_product(),
        ))
    }

    /// Eliminates every quantifier in `expr`: `forall` becomes the conjunction and `exists` the
    /// disjunction of the body over all bindings of the quantified variables.
    pub fn expand_quantifiers(&self, expr: &Expr) -> Result<Expr, ModelError> {
        match expr {
            Expr::Forall(vars, body) | Expr::Exists(vars, body) => {
                let body = self.expand_quantifiers(body)?;
                let names = vars.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
                let instances = self
                    .bindings(vars)?
                    .map(|objs| {
                        let args = objs.iter().map(|o| o.name.as_str()).collect::<Vec<_>>();
                        body.substitute(&bind(vars, &args))
                    })
                    .collect::<Vec<_>>();
                log::trace!(
                    "expanded quantifier over ({}) into {} instances",
                    names.join(", "),
                    instances.len()
                );
                Ok(match expr {
                    Expr::Forall(..) if instances.is_empty() => Expr::Bool(true),
                    Expr::Forall(..) => Expr::And(instances),
                    _ if instances.is_empty() => Expr::Bool(false),
                    _ => Expr::Or(instances),
                })
            }
            _ => expr.map_children(|c| self.expand_quantifiers(c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe_fixture() -> (TypeHierarchy, Vec<Object>) {
        let mut types = TypeHierarchy::new();
        types.declare("thing", None).unwrap();
        types.declare("block", Some("thing")).unwrap();
        types.declare("robot", None).unwrap();
        let objects = vec![
            Object::new("a", "block"),
            Object::new("table", "thing"),
            Object::new("b", "block"),
        ];
        (types, objects)
    }

    #[test]
    fn test_bindings_are_the_ordered_cartesian_product() {
        let (types, objects) = universe_fixture();
        let u = Universe::new(&types, &objects);
        let params = [Parameter::new("x", "block"), Parameter::new("y", "thing")];
        let names = u
            .bindings(&params)
            .unwrap()
            .map(|objs| objs.iter().map(|o| o.name.as_str()).join(","))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["a,a", "a,table", "a,b", "b,a", "b,table", "b,b"]
        );
        assert_eq!(u.count_bindings(&params).unwrap(), 6);
        assert_eq!(u.bindings(&[]).unwrap().count(), 1);
        assert_eq!(
            u.bindings(&[Parameter::new("r", "robot")]).unwrap().count(),
            0
        );
        assert!(matches!(
            u.bindings(&[Parameter::new("r", "ghost")]),
            Err(ModelError::UnknownType(_))
        ));
    }

    #[test]
    fn test_expand_forall_and_exists() {
        let (types, objects) = universe_fixture();
        let u = Universe::new(&types, &objects);
        let e = Expr::forall(
            vec![Parameter::new("z", "thing")],
            Expr::not(Expr::fluent("on", vec![Expr::var("z"), Expr::obj("a")])),
        );
        assert_eq!(
            u.expand_quantifiers(&e).unwrap().to_string(),
            "(and (not (on a a)) (not (on table a)) (not (on b a)))"
        );
        let e = Expr::exists(
            vec![Parameter::new("r", "robot")],
            Expr::fluent("busy", vec![Expr::var("r")]),
        );
        assert_eq!(u.expand_quantifiers(&e).unwrap(), Expr::Bool(false));
    }

    #[test]
    fn test_expand_nested_quantifiers() {
        let (types, objects) = universe_fixture();
        let u = Universe::new(&types, &objects);
        let e = Expr::exists(
            vec![Parameter::new("x", "block")],
            Expr::forall(
                vec![Parameter::new("y", "block")],
                Expr::fluent("above", vec![Expr::var("x"), Expr::var("y")]),
            ),
        );
        let expanded = u.expand_quantifiers(&e).unwrap();
        assert!(!expanded.is_quantified());
        assert_eq!(
            expanded.to_string(),
            "(or (and (above a a) (above a b)) (and (above b a) (above b b)))"
        );
    }
}
