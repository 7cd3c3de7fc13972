/// An owned, lazily created scene object that can be detached from the
/// drawing without being dropped.
#[derive(Debug, Clone)]
pub struct Layer<T> {
    item: Option<T>,
    attached: bool,
}

impl<T> Default for Layer<T> {
    fn default() -> Self {
        Self {
            item: None,
            attached: false,
        }
    }
}

impl<T> Layer<T> {
    /// Create the item on first use, otherwise update it in place. Either way
    /// the layer ends up attached.
    pub fn upsert(&mut self, create: impl FnOnce() -> T, update: impl FnOnce(&mut T)) {
        let item = self.item.get_or_insert_with(create);
        update(item);
        self.attached = true;
    }

    /// Swap the item wholesale and attach it.
    pub fn replace(&mut self, item: T) {
        self.item = Some(item);
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn remove(&mut self) -> Option<T> {
        self.attached = false;
        self.item.take()
    }

    /// The item, only while attached.
    pub fn visible(&self) -> Option<&T> {
        if self.attached { self.item.as_ref() } else { None }
    }

    /// The item, attached or not.
    pub fn get(&self) -> Option<&T> {
        self.item.as_ref()
    }

    pub fn exists(&self) -> bool {
        self.item.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_creates_once_then_updates() {
        let mut layer: Layer<Vec<u8>> = Layer::default();
        assert!(layer.visible().is_none());

        let mut created = 0;
        for v in 1..=3u8 {
            layer.upsert(
                || {
                    created += 1;
                    Vec::new()
                },
                |items| items.push(v),
            );
        }
        assert_eq!(created, 1);
        assert_eq!(layer.visible(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn detach_keeps_item() {
        let mut layer = Layer::default();
        layer.replace(7);
        layer.detach();
        assert!(layer.visible().is_none());
        assert_eq!(layer.get(), Some(&7));
        assert_eq!(layer.remove(), Some(7));
        assert!(!layer.exists() && !layer.is_attached());
    }

    #[test]
    fn replace_shows_a_detached_layer_again() {
        let mut layer = Layer::default();
        layer.replace(vec![1]);
        layer.detach();
        layer.replace(vec![2, 3]);
        assert!(layer.is_attached());
        assert_eq!(layer.visible(), Some(&vec![2, 3]));
    }
}
