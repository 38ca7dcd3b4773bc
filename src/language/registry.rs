use crate::error::Error;
use crate::error::Result;
use crate::Agent;
use crate::Atom;
use std::collections::HashMap;

/// Append-only name tables for atomic propositions and agents.
///
/// Built once by a problem builder and shared read-only across every
/// state, action and formula of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    atoms: Vec<String>,
    agents: Vec<String>,
    atom_ids: HashMap<String, Atom>,
    agent_ids: HashMap<String, Agent>,
}

impl Language {
    pub fn new(atoms: &[&str], agents: &[&str]) -> Self {
        let atoms: Vec<String> = atoms.iter().map(|s| s.to_string()).collect();
        let agents: Vec<String> = agents.iter().map(|s| s.to_string()).collect();
        let atom_ids = atoms
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let agent_ids = agents
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self {
            atoms,
            agents,
            atom_ids,
            agent_ids,
        }
    }

    pub fn atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn agents(&self) -> usize {
        self.agents.len()
    }

    pub fn atom(&self, name: &str) -> Result<Atom> {
        self.atom_ids
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownAtom(name.to_string()))
    }

    pub fn agent(&self, name: &str) -> Result<Agent> {
        self.agent_ids
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownAgent(name.to_string()))
    }

    pub fn atom_name(&self, p: Atom) -> &str {
        &self.atoms[p]
    }

    pub fn agent_name(&self, ag: Agent) -> &str {
        &self.agents[ag]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_roundtrip() {
        let lang = Language::new(&["heads", "opened"], &["a", "b"]);
        assert_eq!(lang.atom("opened").unwrap(), 1);
        assert_eq!(lang.agent("a").unwrap(), 0);
        assert_eq!(lang.atom_name(0), "heads");
        assert_eq!(lang.agent_name(1), "b");
    }

    #[test]
    fn unknown_names_are_reported() {
        let lang = Language::new(&["heads"], &["a"]);
        assert_eq!(
            lang.atom("tails"),
            Err(Error::UnknownAtom("tails".to_string()))
        );
        assert_eq!(lang.agent("z"), Err(Error::UnknownAgent("z".to_string())));
    }
}
