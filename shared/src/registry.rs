//! Which agents are inside which gravity source's field.
//!
//! Sources and agents refer to each other only by id; removing either side just drops the
//! entries. Mutation takes `&mut self`, so a single writer owns every change.

use std::collections::BTreeMap;

use crate::handle::SourceHandle;

pub type AgentId = u64;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldOccupancy {
    occupants: BTreeMap<SourceHandle, Vec<AgentId>>,
}

impl FieldOccupancy {
    /// Returns true when the agent was not already registered with `source`.
    pub fn enter(&mut self, source: SourceHandle, agent: AgentId) -> bool {
        let list = self.occupants.entry(source).or_default();
        match list.binary_search(&agent) {
            Ok(_) => false,
            Err(at) => {
                list.insert(at, agent);
                true
            }
        }
    }

    /// Returns true when the agent was registered with `source`.
    pub fn exit(&mut self, source: SourceHandle, agent: AgentId) -> bool {
        let Some(list) = self.occupants.get_mut(&source) else {
            return false;
        };
        let Ok(at) = list.binary_search(&agent) else {
            return false;
        };
        list.remove(at);
        if list.is_empty() {
            self.occupants.remove(&source);
        }
        true
    }

    /// Apply one agent's field diff for a tick.
    pub fn apply(&mut self, agent: AgentId, entered: &[SourceHandle], exited: &[SourceHandle]) {
        for source in exited {
            self.exit(*source, agent);
        }
        for source in entered {
            self.enter(*source, agent);
        }
    }

    /// Agents inside `source`'s field, ascending.
    pub fn occupants(&self, source: SourceHandle) -> &[AgentId] {
        self.occupants
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drop an agent from every field. Returns the sources it was in.
    pub fn remove_agent(&mut self, agent: AgentId) -> Vec<SourceHandle> {
        let sources: Vec<SourceHandle> = self
            .occupants
            .iter()
            .filter(|(_, list)| list.binary_search(&agent).is_ok())
            .map(|(source, _)| *source)
            .collect();
        for source in &sources {
            self.exit(*source, agent);
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::SourceKind;

    fn floor(id: u32) -> SourceHandle {
        SourceHandle::new(id, SourceKind::FlatFloor)
    }

    #[test]
    fn enter_is_idempotent_and_sorted() {
        let mut reg = FieldOccupancy::default();
        assert!(reg.enter(floor(1), 9));
        assert!(reg.enter(floor(1), 3));
        assert!(!reg.enter(floor(1), 9));
        assert_eq!(reg.occupants(floor(1)), &[3, 9]);
    }

    #[test]
    fn exit_of_last_occupant_clears_source() {
        let mut reg = FieldOccupancy::default();
        reg.enter(floor(1), 4);
        assert!(reg.exit(floor(1), 4));
        assert!(!reg.exit(floor(1), 4));
        assert!(reg.occupants(floor(1)).is_empty());
        assert_eq!(reg, FieldOccupancy::default());
    }

    #[test]
    fn remove_agent_leaves_others() {
        let mut reg = FieldOccupancy::default();
        reg.apply(1, &[floor(1), floor(2)], &[]);
        reg.apply(2, &[floor(2)], &[]);

        assert_eq!(reg.remove_agent(1), vec![floor(1), floor(2)]);
        assert!(reg.occupants(floor(1)).is_empty());
        assert_eq!(reg.occupants(floor(2)), &[2]);
    }
}
