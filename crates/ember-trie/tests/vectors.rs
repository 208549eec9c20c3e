//! Root-hash vectors for the plain (non-secure) trie

use ember_primitives::H256;
use ember_trie::{MemoryNodeStore, Trie, EMPTY_ROOT};
use hex_literal::hex;

fn root_of(updates: &[(&str, &str)]) -> H256 {
    let mut trie = Trie::new(MemoryNodeStore::new());
    for (key, value) in updates {
        trie.insert(key.as_bytes(), value.as_bytes().to_vec()).unwrap();
    }
    let root = trie.root_hash();
    assert_eq!(trie.commit().unwrap(), root);
    root
}

#[test]
fn test_empty_values_only() {
    assert_eq!(root_of(&[("a", ""), ("b", "")]), EMPTY_ROOT);
}

#[test]
fn test_dogs() {
    let root = root_of(&[("doe", "reindeer"), ("dog", "puppy"), ("dogglesworth", "cat")]);
    assert_eq!(
        root,
        H256::from_bytes(hex!("8aad789dff2f538bca5d8ea56e8abe10f4c7ba3a5dea95fea4cd6e7c3a1168d3"))
    );
}

#[test]
fn test_puppy() {
    let root = root_of(&[("do", "verb"), ("horse", "stallion"), ("doge", "coin"), ("dog", "puppy")]);
    assert_eq!(
        root,
        H256::from_bytes(hex!("5991bb8c6514148a29db676a14ac506cd2cd5775ace63c30a4fe457715e9ac84"))
    );
}

#[test]
fn test_foo() {
    let root = root_of(&[("foo", "bar"), ("food", "bass")]);
    assert_eq!(
        root,
        H256::from_bytes(hex!("17beaa1648bafa633cda809c90c04af50fc8aed3cb40d16efbddee6fdf63c4c3"))
    );
}

#[test]
fn test_small_values() {
    let root = root_of(&[("be", "e"), ("dog", "puppy"), ("bed", "d")]);
    assert_eq!(
        root,
        H256::from_bytes(hex!("3f67c7a47520f79faa29255d2d3c084a7a6df0453116ed7232ff10277a8be68b"))
    );
}

#[test]
fn test_key_prefix_of_another() {
    let root = root_of(&[("test", "test"), ("te", "testy")]);
    assert_eq!(
        root,
        H256::from_bytes(hex!("8452568af70d8d140f58d941338542f645fcca50094b20f3c3d8c3df49337928"))
    );
}
