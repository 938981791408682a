use super::ids::{EnsembleId, ReactionId};
use super::provenance::{self, ObjectType, Provenance};
use crate::error::Error;

/// A named group of mechanistically related reactions.
///
/// Reactions keep their insertion order and appear at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    id: EnsembleId,
    name: String,
    reactions: Vec<ReactionId>,
    provenance: Provenance,
}

impl Ensemble {
    pub fn create(name: impl Into<String>, provenance: Option<Provenance>) -> Result<Self, Error> {
        let (id, provenance) =
            provenance::adopt(&[ObjectType::Ensemble], ObjectType::Ensemble, provenance)?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            reactions: Vec::new(),
            provenance,
        })
    }

    #[inline]
    pub fn id(&self) -> EnsembleId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn reactions(&self) -> &[ReactionId] {
        &self.reactions
    }

    #[inline]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }

    pub fn contains(&self, reaction: ReactionId) -> bool {
        self.reactions.contains(&reaction)
    }

    /// Adds `reaction`; returns `false` if it was already a member.
    pub fn add_reaction(&mut self, reaction: ReactionId) -> bool {
        if self.contains(reaction) {
            return false;
        }
        self.reactions.push(reaction);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reaction_is_idempotent() {
        let mut e = Ensemble::create("SN2 variants", None).unwrap();
        let r1 = ReactionId::random();
        let r2 = ReactionId::random();
        assert!(e.add_reaction(r1));
        assert!(e.add_reaction(r2));
        assert!(!e.add_reaction(r1));
        assert_eq!(e.reactions(), &[r1, r2]);
        assert_eq!(e.name(), "SN2 variants");
    }

    #[test]
    fn record_must_describe_an_ensemble() {
        let record = Provenance::input(ObjectType::Pathway, EnsembleId::random());
        assert!(matches!(
            Ensemble::create("x", Some(record)),
            Err(Error::InvalidProvenance(_))
        ));
    }
}
