use super::label::Label;
use crate::LabelId;
use std::collections::HashMap;

/// Structural interner for labels.
///
/// Equal bit patterns share one id; ids are dense and start right after
/// the reserved null label at id 0. Ids are stable for the lifetime of
/// the store, which brackets a whole planner run.
#[derive(Debug, Clone)]
pub struct LabelStore {
    width: usize,
    labels: Vec<Label>,
    ids: HashMap<Vec<u32>, LabelId>,
}

impl LabelStore {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            labels: vec![Label::new(width)],
            ids: HashMap::new(),
        }
    }

    /// intern a label, returning the canonical copy carrying its id
    pub fn emplace(&mut self, label: Label) -> Label {
        assert_eq!(label.width(), self.width, "label width matches the store");
        let key: Vec<u32> = label.bits().as_slice().to_vec();
        match self.ids.get(&key) {
            Some(&id) => self.labels[id].clone(),
            None => {
                let id = self.labels.len();
                let canonical = label.tagged(id);
                self.ids.insert(key, id);
                self.labels.push(canonical.clone());
                canonical
            }
        }
    }

    pub fn get(&self, id: LabelId) -> &Label {
        &self.labels[id]
    }

    /// number of interned labels, the null label included
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NULL_LABEL;

    #[test]
    fn equal_bits_share_one_id() {
        let mut store = LabelStore::new(5);
        let mut a = Label::new(5);
        a.assign(1, true);
        a.assign(3, true);
        let mut b = Label::new(5);
        b.assign(3, true);
        b.assign(1, true);
        let a = store.emplace(a);
        let b = store.emplace(b);
        assert_eq!(a.id(), b.id());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn distinct_bits_get_distinct_ids() {
        let mut store = LabelStore::new(3);
        let empty = store.emplace(Label::new(3));
        let mut one = Label::new(3);
        one.assign(0, true);
        let one = store.emplace(one);
        assert_ne!(empty.id(), one.id());
        assert_ne!(empty.id(), NULL_LABEL);
        assert_eq!(store.get(one.id()), &one);
    }
}
