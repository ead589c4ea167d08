//! Short constructors over [`Schema::basic`], for tests and small tools.

use std::sync::{Arc, LazyLock};

use crate::node::Node;
use crate::schema::{NodeType, Schema};

static BASIC: LazyLock<Schema> = LazyLock::new(Schema::basic);

pub fn schema() -> &'static Schema {
    &BASIC
}

fn node_type(name: &str) -> &'static Arc<NodeType> {
    match BASIC.node_type(name) {
        Ok(ty) => ty,
        Err(e) => unreachable!("basic schema defines {name}: {e}"),
    }
}

pub fn doc(children: Vec<Node>) -> Node {
    node_type("doc").create(children)
}

/// A paragraph; empty text gives an empty paragraph.
pub fn p(text: &str) -> Node {
    textblock("paragraph", text)
}

pub fn h(text: &str) -> Node {
    textblock("heading", text)
}

pub fn blockquote(children: Vec<Node>) -> Node {
    node_type("blockquote").create(children)
}

pub fn figure(children: Vec<Node>) -> Node {
    node_type("figure").create(children)
}

pub fn hr() -> Node {
    node_type("horizontal_rule").create(Vec::new())
}

pub fn img() -> Node {
    node_type("image").create(Vec::new())
}

fn textblock(name: &str, text: &str) -> Node {
    let children = if text.is_empty() {
        Vec::new()
    } else {
        vec![BASIC.text(text)]
    };
    node_type(name).create(children)
}
