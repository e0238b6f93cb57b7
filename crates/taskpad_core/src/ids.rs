use crate::model::TaskId;
use serde::{Deserialize, Serialize};

pub trait IdSource {
    fn next_id(&mut self) -> TaskId;
}

/// Random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&mut self) -> TaskId {
        TaskId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// `task-1`, `task-2`, ... in creation order.
#[derive(Debug, Default)]
pub struct SequentialIdSource {
    issued: u64,
}

impl IdSource for SequentialIdSource {
    fn next_id(&mut self) -> TaskId {
        self.issued += 1;
        TaskId::new(format!("task-{}", self.issued))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    #[default]
    Uuid,
    Sequential,
}

impl IdStrategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "uuid" | "random" => Some(Self::Uuid),
            "sequential" | "seq" => Some(Self::Sequential),
            _ => None,
        }
    }
}

pub fn id_source_for(strategy: IdStrategy) -> Box<dyn IdSource> {
    match strategy {
        IdStrategy::Uuid => Box::new(UuidIdSource),
        IdStrategy::Sequential => Box::new(SequentialIdSource::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::{IdSource, IdStrategy, SequentialIdSource, UuidIdSource, id_source_for};
    use std::collections::HashSet;

    #[test]
    fn sequential_ids_count_up_from_one() {
        let mut source = SequentialIdSource::default();

        assert_eq!(source.next_id(), "task-1");
        assert_eq!(source.next_id(), "task-2");
        assert_eq!(source.next_id(), "task-3");
    }

    #[test]
    fn uuid_ids_are_unique() {
        let mut source = UuidIdSource;
        let ids: HashSet<_> = (0..64).map(|_| source.next_id()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn id_strategy_parse_accepts_aliases() {
        assert_eq!(IdStrategy::parse("UUID"), Some(IdStrategy::Uuid));
        assert_eq!(IdStrategy::parse(" seq "), Some(IdStrategy::Sequential));
        assert_eq!(IdStrategy::parse("snowflake"), None);
    }

    #[test]
    fn id_source_for_sequential_is_deterministic() {
        let mut source = id_source_for(IdStrategy::Sequential);
        assert_eq!(source.next_id(), "task-1");
    }
}
