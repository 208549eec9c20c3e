//! Merkle-Patricia trie

use std::mem;

use ember_crypto::keccak256;
use ember_primitives::H256;
use tracing::trace;

use crate::error::{TrieError, TrieResult};
use crate::nibbles::{common_prefix, to_nibbles};
use crate::node::Node;
use crate::store::NodeStore;
use crate::EMPTY_ROOT;

/// Merkle-Patricia trie over a [`NodeStore`]
///
/// Updates work on an in-memory node tree; stored nodes are loaded as paths
/// reach them. [`Trie::commit`] writes every node of 32 bytes or more (and the
/// root) back to the store. A `MissingNode` error from an update leaves the
/// trie unusable.
#[derive(Debug)]
pub struct Trie<S> {
    root: Node,
    store: S,
}

impl<S: NodeStore> Trie<S> {
    /// Empty trie
    pub fn new(store: S) -> Self {
        Self {
            root: Node::Empty,
            store,
        }
    }

    /// Trie rooted at a previously committed `root`
    pub fn open(root: H256, store: S) -> Self {
        let root = if root == EMPTY_ROOT {
            Node::Empty
        } else {
            Node::Hash(root)
        };
        Self { root, store }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Check if the trie holds no keys
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Value under `key`
    pub fn get(&self, key: &[u8]) -> TrieResult<Option<Vec<u8>>> {
        lookup(&self.store, &self.root, &to_nibbles(key))
    }

    /// Set `key` to `value`. An empty value removes the key.
    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) -> TrieResult<()> {
        if value.is_empty() {
            return self.remove(key);
        }
        let root = mem::take(&mut self.root);
        self.root = self.insert_at(root, &to_nibbles(key), value)?;
        Ok(())
    }

    /// Remove `key` if present
    pub fn remove(&mut self, key: &[u8]) -> TrieResult<()> {
        let root = mem::take(&mut self.root);
        self.root = self.remove_at(root, &to_nibbles(key))?;
        Ok(())
    }

    /// Root hash of the current contents
    pub fn root_hash(&self) -> H256 {
        match &self.root {
            Node::Empty => EMPTY_ROOT,
            Node::Hash(hash) => *hash,
            node => keccak256(&node.encode()),
        }
    }

    /// Write all nodes to the store and collapse the tree to its root hash
    pub fn commit(&mut self) -> TrieResult<H256> {
        let hash = match mem::take(&mut self.root) {
            Node::Empty => EMPTY_ROOT,
            Node::Hash(hash) => hash,
            node => {
                let node = self.commit_node(node)?;
                let encoded = node.encode();
                let hash = keccak256(&encoded);
                self.store.put(hash, encoded)?;
                hash
            }
        };
        trace!(root = %hash, "trie committed");
        self.root = if hash == EMPTY_ROOT {
            Node::Empty
        } else {
            Node::Hash(hash)
        };
        Ok(hash)
    }

    fn resolve(&self, hash: &H256) -> TrieResult<Node> {
        resolve(&self.store, hash)
    }

    fn insert_at(&self, node: Node, path: &[u8], value: Vec<u8>) -> TrieResult<Node> {
        match node {
            Node::Empty => Ok(Node::Leaf {
                path: path.to_vec(),
                value,
            }),
            Node::Leaf {
                path: leaf_path,
                value: leaf_value,
            } => {
                let common = common_prefix(&leaf_path, path);
                if common == leaf_path.len() && common == path.len() {
                    return Ok(Node::Leaf {
                        path: leaf_path,
                        value,
                    });
                }
                let mut branch = Node::empty_branch();
                place(&mut branch, &leaf_path[common..], leaf_value);
                place(&mut branch, &path[common..], value);
                Ok(with_prefix(&path[..common], branch))
            }
            Node::Extension {
                path: ext_path,
                child,
            } => {
                let common = common_prefix(&ext_path, path);
                if common == ext_path.len() {
                    let child = self.insert_at(*child, &path[common..], value)?;
                    return Ok(Node::Extension {
                        path: ext_path,
                        child: Box::new(child),
                    });
                }
                let mut branch = Node::empty_branch();
                if let Node::Branch { children, .. } = &mut branch {
                    let rest = &ext_path[common + 1..];
                    children[ext_path[common] as usize] = if rest.is_empty() {
                        *child
                    } else {
                        Node::Extension {
                            path: rest.to_vec(),
                            child,
                        }
                    };
                }
                place(&mut branch, &path[common..], value);
                Ok(with_prefix(&path[..common], branch))
            }
            Node::Branch {
                mut children,
                value: branch_value,
            } => match path.split_first() {
                None => Ok(Node::Branch {
                    children,
                    value: Some(value),
                }),
                Some((&nibble, rest)) => {
                    let slot = &mut children[nibble as usize];
                    *slot = self.insert_at(mem::take(slot), rest, value)?;
                    Ok(Node::Branch {
                        children,
                        value: branch_value,
                    })
                }
            },
            Node::Hash(hash) => {
                let node = self.resolve(&hash)?;
                self.insert_at(node, path, value)
            }
        }
    }

    fn remove_at(&self, node: Node, path: &[u8]) -> TrieResult<Node> {
        match node {
            Node::Empty => Ok(Node::Empty),
            Node::Leaf {
                path: leaf_path,
                value,
            } => {
                if leaf_path == path {
                    Ok(Node::Empty)
                } else {
                    Ok(Node::Leaf {
                        path: leaf_path,
                        value,
                    })
                }
            }
            Node::Extension {
                path: ext_path,
                child,
            } => {
                if !path.starts_with(&ext_path) {
                    return Ok(Node::Extension {
                        path: ext_path,
                        child,
                    });
                }
                let child = self.remove_at(*child, &path[ext_path.len()..])?;
                self.join(ext_path, child)
            }
            Node::Branch {
                mut children,
                mut value,
            } => {
                match path.split_first() {
                    None => value = None,
                    Some((&nibble, rest)) => {
                        let slot = &mut children[nibble as usize];
                        *slot = self.remove_at(mem::take(slot), rest)?;
                    }
                }
                self.collapse(children, value)
            }
            Node::Hash(hash) => {
                let node = self.resolve(&hash)?;
                self.remove_at(node, path)
            }
        }
    }

    /// Put `prefix` in front of `node`, merging with a leaf or extension
    fn join(&self, prefix: Vec<u8>, node: Node) -> TrieResult<Node> {
        match node {
            Node::Empty => Ok(Node::Empty),
            Node::Leaf { path, value } => Ok(Node::Leaf {
                path: [prefix, path].concat(),
                value,
            }),
            Node::Extension { path, child } => Ok(Node::Extension {
                path: [prefix, path].concat(),
                child,
            }),
            Node::Hash(hash) => {
                let node = self.resolve(&hash)?;
                self.join(prefix, node)
            }
            branch => Ok(with_prefix(&prefix, branch)),
        }
    }

    /// Normalize a branch that may have lost children
    fn collapse(&self, mut children: Box<[Node; 16]>, value: Option<Vec<u8>>) -> TrieResult<Node> {
        let mut occupied = children
            .iter()
            .enumerate()
            .filter(|(_, child)| !child.is_empty())
            .map(|(i, _)| i);
        let first = occupied.next();
        let more = occupied.next().is_some();

        match (first, more, value) {
            (None, _, None) => Ok(Node::Empty),
            (None, _, Some(value)) => Ok(Node::Leaf {
                path: Vec::new(),
                value,
            }),
            (Some(nibble), false, None) => {
                let child = mem::take(&mut children[nibble]);
                self.join(vec![nibble as u8], child)
            }
            (_, _, value) => Ok(Node::Branch { children, value }),
        }
    }

    fn commit_node(&mut self, node: Node) -> TrieResult<Node> {
        Ok(match node {
            Node::Extension { path, child } => Node::Extension {
                path,
                child: Box::new(self.commit_child(*child)?),
            },
            Node::Branch {
                mut children,
                value,
            } => {
                for child in children.iter_mut() {
                    *child = self.commit_child(mem::take(child))?;
                }
                Node::Branch { children, value }
            }
            other => other,
        })
    }

    fn commit_child(&mut self, node: Node) -> TrieResult<Node> {
        match node {
            Node::Empty | Node::Hash(_) => Ok(node),
            node => {
                let node = self.commit_node(node)?;
                let encoded = node.encode();
                if encoded.len() < 32 {
                    return Ok(node);
                }
                let hash = keccak256(&encoded);
                self.store.put(hash, encoded)?;
                Ok(Node::Hash(hash))
            }
        }
    }
}

/// Read `key` from the trie committed under `root` without building a [`Trie`]
pub fn read<S: NodeStore + ?Sized>(store: &S, root: &H256, key: &[u8]) -> TrieResult<Option<Vec<u8>>> {
    if *root == EMPTY_ROOT {
        return Ok(None);
    }
    lookup(store, &Node::Hash(*root), &to_nibbles(key))
}

fn resolve<S: NodeStore + ?Sized>(store: &S, hash: &H256) -> TrieResult<Node> {
    let data = store.get(hash)?.ok_or(TrieError::MissingNode(*hash))?;
    Node::decode(&data)
}

fn lookup<S: NodeStore + ?Sized>(store: &S, node: &Node, path: &[u8]) -> TrieResult<Option<Vec<u8>>> {
    match node {
        Node::Empty => Ok(None),
        Node::Leaf {
            path: leaf_path,
            value,
        } => Ok((leaf_path.as_slice() == path).then(|| value.clone())),
        Node::Extension {
            path: ext_path,
            child,
        } => match path.strip_prefix(ext_path.as_slice()) {
            Some(rest) => lookup(store, child, rest),
            None => Ok(None),
        },
        Node::Branch { children, value } => match path.split_first() {
            None => Ok(value.clone()),
            Some((&nibble, rest)) => lookup(store, &children[nibble as usize], rest),
        },
        Node::Hash(hash) => {
            let node = resolve(store, hash)?;
            lookup(store, &node, path)
        }
    }
}

/// Hang `value` off `branch` at the start of `path`
fn place(branch: &mut Node, path: &[u8], value: Vec<u8>) {
    if let Node::Branch {
        children,
        value: branch_value,
    } = branch
    {
        match path.split_first() {
            None => *branch_value = Some(value),
            Some((&nibble, rest)) => {
                children[nibble as usize] = Node::Leaf {
                    path: rest.to_vec(),
                    value,
                }
            }
        }
    }
}

fn with_prefix(prefix: &[u8], node: Node) -> Node {
    if prefix.is_empty() {
        node
    } else {
        Node::Extension {
            path: prefix.to_vec(),
            child: Box::new(node),
        }
    }
}
