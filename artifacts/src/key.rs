use std::fmt::{self, Display};

/// The three kinds of artifacts exchanged between pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Raw,
    Processed,
    Model,
}

impl ArtifactKind {
    /// Returns the key prefix under which artifacts of this kind live.
    pub fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Raw => "raw/",
            ArtifactKind::Processed => "processed/",
            ArtifactKind::Model => "models/",
        }
    }

    const ALL: [ArtifactKind; 3] = [ArtifactKind::Raw, ArtifactKind::Processed, ArtifactKind::Model];
}

/// A logical artifact key, rendered as `<prefix><name>`.
///
/// The store backends only ever see the rendered string, the kind is only
/// meaningful to the stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactKey {
    kind: ArtifactKind,
    name: String,
}

impl ArtifactKey {
    /// Creates a new `ArtifactKey`.
    ///
    /// # Arguments
    /// * `kind` - The artifact kind, selects the prefix.
    /// * `name` - The logical dataset name shared by every stage.
    pub fn new(kind: ArtifactKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn raw(name: impl Into<String>) -> Self {
        Self::new(ArtifactKind::Raw, name)
    }

    pub fn processed(name: impl Into<String>) -> Self {
        Self::new(ArtifactKind::Processed, name)
    }

    pub fn model(name: impl Into<String>) -> Self {
        Self::new(ArtifactKind::Model, name)
    }

    /// Parses a rendered key back into its kind and name.
    ///
    /// # Returns
    /// `None` if the key has no known prefix or an empty name.
    pub fn parse(key: &str) -> Option<Self> {
        ArtifactKind::ALL.into_iter().find_map(|kind| {
            key.strip_prefix(kind.prefix())
                .filter(|name| !name.is_empty())
                .map(|name| Self::new(kind, name))
        })
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the key handed to the store.
    pub fn path(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.name)
    }
}

impl Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.name)
    }
}
