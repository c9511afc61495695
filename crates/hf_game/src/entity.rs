/// Stable handle for a transient entity. Renderers key visuals off it;
/// the id is never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIds {
    next: u64,
}

impl EntityIds {
    pub fn allocate(&mut self) -> EntityId {
        self.next += 1;
        EntityId(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut ids = EntityIds::default();
        let a = ids.allocate();
        let b = ids.allocate();
        assert!(b > a);
        assert_ne!(a, b);
    }
}
