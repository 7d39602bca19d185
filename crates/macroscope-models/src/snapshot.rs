use serde::{Deserialize, Serialize};

/// Reference market data shown next to the indicators. Carries no alert
/// semantics and never enters the evaluation context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub groups: Vec<SnapshotGroup>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_group(&mut self, group: SnapshotGroup) {
        self.groups.push(group);
    }

    /// First value stored under `label` in any group.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.groups.iter().find_map(|g| g.get(label))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.entries.is_empty())
    }
}

/// An ordered set of formatted values from one data provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotGroup {
    pub title: String,
    pub entries: Vec<SnapshotEntry>,
}

impl SnapshotGroup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.entries.push(SnapshotEntry {
            label: label.into(),
            value: value.into(),
        });
    }

    pub fn with(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(label, value);
        self
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotEntry {
    pub label: String,
    pub value: String,
}
