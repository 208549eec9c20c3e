//! Trie nodes and their RLP form
//!
//! A child whose encoding is shorter than 32 bytes is embedded in its parent;
//! anything longer is referenced by the keccak-256 of its encoding.

use ember_crypto::keccak256;
use ember_primitives::H256;
use rlp::{Rlp, RlpStream};

use crate::error::{TrieError, TrieResult};
use crate::nibbles::{decode_compact, encode_compact};

/// A trie node
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Node {
    /// No node
    #[default]
    Empty,
    /// Remaining path and the stored value
    Leaf {
        /// Nibbles below the parent
        path: Vec<u8>,
        /// Value bytes
        value: Vec<u8>,
    },
    /// Shared path segment above a single child
    Extension {
        /// Nibbles below the parent
        path: Vec<u8>,
        /// Always a branch, possibly behind a hash
        child: Box<Node>,
    },
    /// Sixteen-way fork plus the value ending here
    Branch {
        /// Children by next nibble
        children: Box<[Node; 16]>,
        /// Value whose key ends at this node
        value: Option<Vec<u8>>,
    },
    /// Node held in the store, not yet loaded
    Hash(H256),
}

impl Node {
    /// Branch with no children and no value
    pub fn empty_branch() -> Self {
        Node::Branch {
            children: Box::default(),
            value: None,
        }
    }

    /// Check for [`Node::Empty`]
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// RLP encoding
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Node::Empty => rlp::NULL_RLP.to_vec(),
            Node::Leaf { path, value } => {
                let mut stream = RlpStream::new_list(2);
                stream.append(&encode_compact(path, true));
                stream.append(value);
                stream.out().to_vec()
            }
            Node::Extension { path, child } => {
                let mut stream = RlpStream::new_list(2);
                stream.append(&encode_compact(path, false));
                child.append_reference(&mut stream);
                stream.out().to_vec()
            }
            Node::Branch { children, value } => {
                let mut stream = RlpStream::new_list(17);
                for child in children.iter() {
                    child.append_reference(&mut stream);
                }
                match value {
                    Some(value) => stream.append(value),
                    None => stream.append_empty_data(),
                };
                stream.out().to_vec()
            }
            Node::Hash(hash) => rlp::encode(hash).to_vec(),
        }
    }

    /// How a parent refers to this node: inline when short, hash otherwise
    fn append_reference(&self, stream: &mut RlpStream) {
        match self {
            Node::Empty => {
                stream.append_empty_data();
            }
            Node::Hash(hash) => {
                stream.append(hash);
            }
            node => {
                let encoded = node.encode();
                if encoded.len() < 32 {
                    stream.append_raw(&encoded, 1);
                } else {
                    stream.append(&keccak256(&encoded));
                }
            }
        }
    }

    /// Decode a node read from the store
    pub fn decode(data: &[u8]) -> TrieResult<Self> {
        Self::decode_rlp(&Rlp::new(data))
    }

    fn decode_rlp(rlp: &Rlp<'_>) -> TrieResult<Self> {
        if !rlp.is_list() {
            return Err(TrieError::InvalidNode("node is not a list".into()));
        }
        match rlp.item_count()? {
            2 => {
                let compact: Vec<u8> = rlp.val_at(0)?;
                let (path, leaf) = decode_compact(&compact)?;
                if leaf {
                    Ok(Node::Leaf {
                        path,
                        value: rlp.val_at(1)?,
                    })
                } else {
                    Ok(Node::Extension {
                        path,
                        child: Box::new(Self::decode_reference(&rlp.at(1)?)?),
                    })
                }
            }
            17 => {
                let mut children: Box<[Node; 16]> = Box::default();
                for (i, child) in children.iter_mut().enumerate() {
                    *child = Self::decode_reference(&rlp.at(i)?)?;
                }
                let value: Vec<u8> = rlp.val_at(16)?;
                Ok(Node::Branch {
                    children,
                    value: (!value.is_empty()).then_some(value),
                })
            }
            n => Err(TrieError::InvalidNode(format!("node with {n} items"))),
        }
    }

    fn decode_reference(rlp: &Rlp<'_>) -> TrieResult<Self> {
        if rlp.is_list() {
            return Self::decode_rlp(rlp);
        }
        let data = rlp.data()?;
        match data.len() {
            0 => Ok(Node::Empty),
            32 => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(data);
                Ok(Node::Hash(H256::from_bytes(hash)))
            }
            n => Err(TrieError::InvalidNode(format!("{n}-byte child reference"))),
        }
    }
}
