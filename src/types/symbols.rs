use std::collections::HashMap;

/// Index of a variable inside one [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Maps variable names (e.g. `"field_status"`, `"x"`) to [`VarId`]s.
///
/// One table is created per analysis call and threaded through every guard
/// compiled by that call, so a name used by two guards resolves to the same
/// variable. Tables are never shared between calls.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    ids: HashMap<String, VarId>,
    names: Vec<String>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the variable for `name`, registering it on first use.
    pub fn intern(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = VarId::new(self.names.len());
        self.ids.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        id
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<VarId> {
        self.ids.get(name).copied()
    }

    /// Name of a registered variable.
    ///
    /// # Panics
    ///
    /// Panics if `id` was produced by a different table.
    #[must_use]
    pub fn name(&self, id: VarId) -> &str {
        &self.names[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All registered variables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (VarId::new(i), name.as_str()))
    }
}
