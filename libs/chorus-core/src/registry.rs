use super::*;
use tokio::sync::mpsc::Sender;

pub type EndpointId = String;

/// A joined connection. Created on join, dropped on leave, never edited.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub id: EndpointId,
    pub voice: String,
    /// Join sequence number, unique for the lifetime of the registry.
    pub seq: u64,
    pub(crate) outbox: Sender<Dispatch>,
}

impl Endpoint {
    pub fn outbox(&self) -> &Sender<Dispatch> {
        &self.outbox
    }
}

/// Joined endpoints in join order.
///
/// Not synchronized on its own: the [`Coordinator`] keeps it behind its lock.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    endpoints: Vec<Endpoint>,
    next_seq: u64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        id: EndpointId,
        voice: String,
        outbox: Sender<Dispatch>,
    ) -> ChorusResult<&Endpoint> {
        if self.contains(&id) {
            return Err(ChorusError::AlreadyRegistered(id));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        // seq only grows, so pushing keeps the vec in join order
        self.endpoints.push(Endpoint {
            id,
            voice,
            seq,
            outbox,
        });

        Ok(&self.endpoints[self.endpoints.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Option<Endpoint> {
        let pos = self.endpoints.iter().position(|e| e.id == id)?;
        Some(self.endpoints.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Copy of the current membership, ordered by join sequence.
    pub fn snapshot(&self) -> Vec<Endpoint> {
        self.endpoints.clone()
    }

    pub fn size(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::sync::mpsc::channel;

    fn outbox() -> Sender<Dispatch> {
        channel(1).0
    }

    #[test]
    fn add_and_remove() {
        let mut registry = ConnectionRegistry::new();
        assert!(registry.is_empty());

        let endpoint = registry.add("e1".into(), "Alex".into(), outbox()).unwrap();
        assert_eq!(endpoint.seq, 0);
        assert_eq!(endpoint.voice, "Alex");
        registry.add("e2".into(), "Karen".into(), outbox()).unwrap();
        assert_eq!(registry.size(), 2);

        assert_eq!(registry.remove("e1").map(|e| e.seq), Some(0));
        assert!(registry.remove("e1").is_none());
        assert_eq!(registry.size(), 1);
        assert!(registry.contains("e2"));
    }

    #[test]
    fn duplicate_add_fails_without_side_effects() {
        let mut registry = ConnectionRegistry::new();
        registry.add("e1".into(), "Alex".into(), outbox()).unwrap();

        assert_eq!(
            registry
                .add("e1".into(), "Samantha".into(), outbox())
                .unwrap_err(),
            ChorusError::AlreadyRegistered("e1".into())
        );
        assert_eq!(registry.size(), 1);
        assert_eq!(registry.get("e1").unwrap().voice, "Alex");
    }

    #[test]
    fn snapshot_is_join_ordered_and_detached() {
        let mut registry = ConnectionRegistry::new();
        for id in ["c", "a", "b"] {
            registry.add(id.into(), "v".into(), outbox()).unwrap();
        }
        registry.remove("a");
        registry.add("a".into(), "v".into(), outbox()).unwrap();

        let snapshot = registry.snapshot();
        registry.remove("c");

        let order: Vec<_> = snapshot.iter().map(|e| (e.id.as_str(), e.seq)).collect();
        assert_eq!(order, vec![("c", 0), ("b", 2), ("a", 3)]);
        assert_eq!(registry.size(), 2);
    }
}
