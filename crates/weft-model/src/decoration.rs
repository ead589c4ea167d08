use std::collections::BTreeMap;
use std::fmt;

use crate::node::Node;

/// Attributes attached to a decorated node (`class`, `data-*`, ...).
pub type Attrs = BTreeMap<String, String>;

/// A visual annotation that never changes the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoration {
    /// Attributes applied to the node spanning `from..to`.
    Node { from: usize, to: usize, attrs: Attrs },
    /// An element drawn at a single position.
    Widget {
        pos: usize,
        class: String,
        key: Option<String>,
    },
}

impl Decoration {
    pub fn node(from: usize, to: usize, attrs: Attrs) -> Self {
        Decoration::Node { from, to, attrs }
    }

    pub fn widget(pos: usize, class: impl Into<String>) -> Self {
        Decoration::Widget {
            pos,
            class: class.into(),
            key: None,
        }
    }

    pub fn with_key(self, key: impl Into<String>) -> Self {
        match self {
            Decoration::Widget { pos, class, .. } => Decoration::Widget {
                pos,
                class,
                key: Some(key.into()),
            },
            other => other,
        }
    }

    pub fn from(&self) -> usize {
        match self {
            Decoration::Node { from, .. } => *from,
            Decoration::Widget { pos, .. } => *pos,
        }
    }

    pub fn to(&self) -> usize {
        match self {
            Decoration::Node { to, .. } => *to,
            Decoration::Widget { pos, .. } => *pos,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Decoration::Node { attrs, .. } => attrs.get(name).map(String::as_str),
            Decoration::Widget { class, .. } if name == "class" => Some(class),
            Decoration::Widget { .. } => None,
        }
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoration::Node { from, to, attrs } => {
                write!(f, "node {from}..{to}")?;
                for (name, value) in attrs {
                    write!(f, " {name}={value:?}")?;
                }
                Ok(())
            }
            Decoration::Widget { pos, class, key } => {
                write!(f, "widget {pos} class={class:?}")?;
                if let Some(key) = key {
                    write!(f, " key={key:?}")?;
                }
                Ok(())
            }
        }
    }
}

/// Decorations for one document, ordered by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set for `doc`. Decorations reaching past the document are dropped.
    pub fn create(doc: &Node, mut decorations: Vec<Decoration>) -> Self {
        let size = doc.content().size();
        decorations.retain(|d| d.to() <= size && d.from() <= d.to());
        decorations.sort_by_key(|d| (d.from(), d.to()));
        Self { decorations }
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    /// Decorations overlapping `from..=to`.
    pub fn find(&self, from: usize, to: usize) -> Vec<&Decoration> {
        self.decorations
            .iter()
            .filter(|d| d.from() <= to && d.to() >= from)
            .collect()
    }
}

impl fmt::Display for DecorationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, decoration) in self.decorations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{decoration}")?;
        }
        Ok(())
    }
}
