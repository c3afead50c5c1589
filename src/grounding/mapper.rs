use std::collections::HashMap;

use super::GroundingError;
use crate::model::ActionInstance;

/// Translates between the ground actions of a grounding output and the lifted instances they
/// stand for. Only knows the instances of the grounding that built it.
#[derive(Clone, Debug, Default)]
pub struct ActionInstanceMapper {
    lifted: HashMap<String, ActionInstance>,
    ground: HashMap<ActionInstance, String>,
}

impl ActionInstanceMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, ground_name: String, lifted: ActionInstance) {
        self.ground.insert(lifted.clone(), ground_name.clone());
        self.lifted.insert(ground_name, lifted);
    }

    /// The lifted instance behind the ground instance `ai`.
    pub fn map_back(&self, ai: &ActionInstance) -> Result<ActionInstance, GroundingError> {
        if !ai.args.is_empty() {
            return Err(GroundingError::UnknownInstance(ai.clone()));
        }
        self.lifted
            .get(&ai.action)
            .cloned()
            .ok_or_else(|| GroundingError::UnknownInstance(ai.clone()))
    }

    /// Name of the ground action emitted for the lifted instance `ai`, if it survived pruning.
    pub fn ground_name(&self, ai: &ActionInstance) -> Option<&str> {
        self.ground.get(ai).map(String::as_str)
    }

    pub fn contains(&self, ground_name: &str) -> bool {
        self.lifted.contains_key(ground_name)
    }

    pub fn len(&self) -> usize {
        self.lifted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lifted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_back_only_known_instances() {
        let mut mapper = ActionInstanceMapper::new();
        let lifted = ActionInstance::new("move", ["b", "a", "table"]);
        mapper.insert("move_b_a_table".to_string(), lifted.clone());

        let ground = ActionInstance::ground("move_b_a_table");
        assert_eq!(mapper.map_back(&ground).unwrap(), lifted);
        assert_eq!(mapper.ground_name(&lifted), Some("move_b_a_table"));

        assert!(matches!(
            mapper.map_back(&ActionInstance::ground("move_a_b_table")),
            Err(GroundingError::UnknownInstance(_))
        ));
        assert!(matches!(
            mapper.map_back(&ActionInstance::new("move_b_a_table", ["x"])),
            Err(GroundingError::UnknownInstance(_))
        ));
    }
}
