use std::fmt;

use serde::{Deserialize, Serialize};

/// An action applied to concrete arguments. Ground actions take no arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionInstance {
    pub action: String,
    pub args: Vec<String>,
}

impl ActionInstance {
    pub fn new<S: Into<String>>(
        action: impl Into<String>,
        args: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            action: action.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ground(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: Vec::new(),
        }
    }
}

impl fmt::Display for ActionInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.action)?;
        for (i, a) in self.args.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", a)?;
        }
        write!(f, ")")
    }
}

/// An ordered sequence of action instances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialPlan {
    actions: Vec<ActionInstance>,
}

impl SequentialPlan {
    pub fn new(actions: Vec<ActionInstance>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[ActionInstance] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Maps every instance through `f`, keeping length and order. Stops at the first error.
    pub fn replace_action_instances<E>(
        &self,
        f: impl FnMut(&ActionInstance) -> Result<ActionInstance, E>,
    ) -> Result<SequentialPlan, E> {
        Ok(SequentialPlan {
            actions: self.actions.iter().map(f).collect::<Result<_, _>>()?,
        })
    }

    /// The plan as `(action-name, arguments)` pairs.
    pub fn to_pairs(&self) -> Vec<(String, Vec<String>)> {
        self.actions
            .iter()
            .map(|a| (a.action.clone(), a.args.clone()))
            .collect()
    }
}

impl FromIterator<ActionInstance> for SequentialPlan {
    fn from_iter<I: IntoIterator<Item = ActionInstance>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for SequentialPlan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "SequentialPlan:")?;
        for a in &self.actions {
            writeln!(f, "    {}", a)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_order_and_length() {
        let plan: SequentialPlan = ["a", "b", "c"]
            .into_iter()
            .map(ActionInstance::ground)
            .collect();
        let lifted = plan
            .replace_action_instances(|ai| {
                Ok::<_, ()>(ActionInstance::new("move", [ai.action.as_str()]))
            })
            .unwrap();
        assert_eq!(
            lifted.to_pairs(),
            vec![
                ("move".to_string(), vec!["a".to_string()]),
                ("move".to_string(), vec!["b".to_string()]),
                ("move".to_string(), vec!["c".to_string()]),
            ]
        );
        let failed = plan.replace_action_instances(|ai| {
            if ai.action == "b" {
                Err(ai.action.clone())
            } else {
                Ok(ai.clone())
            }
        });
        assert_eq!(failed, Err("b".to_string()));
    }

    #[test]
    fn test_serializes_as_pairs() {
        let plan = SequentialPlan::new(vec![ActionInstance::new("load", ["p1", "t1", "l1"])]);
        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(
            json,
            r#"{"actions":[{"action":"load","args":["p1","t1","l1"]}]}"#
        );
        assert_eq!(plan.to_string(), "SequentialPlan:\n    load(p1, t1, l1)\n");
    }
}
